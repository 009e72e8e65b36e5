//! Output formatting for batch results and catalog listings.
//!
//! Text output draws the merged table with box characters; separator rows
//! span the full table width. JSON output is meant for scripting.

use crate::batch::{is_separator, BatchResult};
use crate::catalog::{QueryCatalog, QueryDefinition};
use crate::db::Value;
use serde::Serialize;
use std::time::Duration;

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Box-drawn table.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

#[derive(Debug, Serialize)]
struct QueryRef<'a> {
    id: usize,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonBatch<'a> {
    queries: Vec<QueryRef<'a>>,
    schema: &'a [String],
    rows: &'a [Vec<Value>],
    data_rows: usize,
    duration_ms: u64,
}

/// Formats command results.
pub struct BatchOutput {
    format: OutputFormat,
}

impl BatchOutput {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a merged batch result for the queries that produced it.
    pub fn format_batch(
        &self,
        result: &BatchResult,
        queries: &[&QueryDefinition],
        duration: Duration,
    ) -> String {
        match self.format {
            OutputFormat::Text => {
                let data_rows = result.data_rows().count();
                format!(
                    "{}{} row{} from {} quer{} ({}ms)\n",
                    render_table(result),
                    data_rows,
                    if data_rows == 1 { "" } else { "s" },
                    queries.len(),
                    if queries.len() == 1 { "y" } else { "ies" },
                    duration.as_millis()
                )
            }
            OutputFormat::Json => {
                let output = JsonBatch {
                    queries: queries
                        .iter()
                        .map(|q| QueryRef {
                            id: q.id,
                            name: &q.display_name,
                        })
                        .collect(),
                    schema: &result.schema,
                    rows: &result.rows,
                    data_rows: result.data_rows().count(),
                    duration_ms: duration.as_millis() as u64,
                };
                to_json(&output)
            }
        }
    }

    /// Formats the list of catalog queries.
    pub fn format_queries(&self, catalog: &QueryCatalog) -> String {
        match self.format {
            OutputFormat::Text => catalog
                .list_queries()
                .iter()
                .map(|q| format!("{:>3}  {}\n", q.id, q.display_name))
                .collect(),
            OutputFormat::Json => to_json(&catalog.list_queries()),
        }
    }

    /// Formats the list of scenarios with their member queries.
    pub fn format_scenarios(&self, catalog: &QueryCatalog) -> String {
        match self.format {
            OutputFormat::Text => {
                let mut out = String::new();
                for scenario in catalog.scenarios() {
                    out.push_str(&format!("{:>3}  {}\n", scenario.id, scenario.display_name));
                    for id in &scenario.member_query_ids {
                        let name = catalog
                            .get(*id)
                            .map(|q| q.display_name.as_str())
                            .unwrap_or("?");
                        out.push_str(&format!("       {id:>3}  {name}\n"));
                    }
                }
                if out.is_empty() {
                    out.push_str("(no scenarios defined)\n");
                }
                out
            }
            OutputFormat::Json => to_json(&catalog.scenarios()),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    let mut json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {}\"}}", e));
    json.push('\n');
    json
}

/// Renders the merged table, header first.
pub fn render_table(result: &BatchResult) -> String {
    if result.schema.is_empty() && result.rows.is_empty() {
        return "(empty result)\n".to_string();
    }

    let widths = column_widths(result);
    let mut out = String::new();

    out.push_str(&border(&widths, '┌', '┬', '┐'));
    out.push_str(&cells_line(
        result.schema.iter().map(String::as_str),
        &widths,
    ));
    out.push_str(&border(&widths, '├', '┼', '┤'));

    for row in &result.rows {
        if is_separator(row) {
            out.push_str(&separator_line(row, &widths));
        } else {
            let display: Vec<String> = row.iter().map(Value::to_display_string).collect();
            out.push_str(&cells_line(display.iter().map(String::as_str), &widths));
        }
    }

    out.push_str(&border(&widths, '└', '┴', '┘'));
    out
}

/// Widths for every column the table needs; ragged rows may add columns.
fn column_widths(result: &BatchResult) -> Vec<usize> {
    let columns = result
        .rows
        .iter()
        .filter(|row| !is_separator(row))
        .map(Vec::len)
        .chain(std::iter::once(result.schema.len()))
        .max()
        .unwrap_or(0)
        .max(1);

    let mut widths = vec![MIN_COLUMN_WIDTH; columns];
    for (i, name) in result.schema.iter().enumerate() {
        widths[i] = widths[i].max(name.chars().count());
    }
    for row in result.rows.iter().filter(|row| !is_separator(row)) {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.to_display_string().chars().count());
        }
    }

    let mut widths: Vec<usize> = widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect();

    // Separator labels span the whole table; widen the last column to fit them.
    let label_width = result
        .rows
        .iter()
        .filter(|row| is_separator(row))
        .filter_map(|row| row.first())
        .map(|label| label.to_display_string().chars().count())
        .max()
        .unwrap_or(0);
    let inner = inner_width(&widths);
    if label_width > inner {
        if let Some(last) = widths.last_mut() {
            *last += label_width - inner;
        }
    }
    widths
}

/// Width between the outer borders, excluding their padding.
fn inner_width(widths: &[usize]) -> usize {
    widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 3
}

/// Truncates a string to fit within the given width, adding ellipsis if needed.
fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    }
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let mut line = String::new();
    line.push(left);
    for (i, &width) in widths.iter().enumerate() {
        line.push_str(&"─".repeat(width + 2));
        if i < widths.len() - 1 {
            line.push(mid);
        }
    }
    line.push(right);
    line.push('\n');
    line
}

/// Renders one line of cells. Missing cells are left blank.
fn cells_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut cells = cells;
    let mut line = String::from("│");
    for &width in widths {
        let cell = truncate(cells.next().unwrap_or(""), width);
        line.push_str(&format!(" {:width$} │", cell, width = width));
    }
    line.push('\n');
    line
}

fn separator_line(row: &[Value], widths: &[usize]) -> String {
    let inner = inner_width(widths);
    let label = row.first().map(Value::to_display_string).unwrap_or_default();
    format!("│ {:inner$} │\n", truncate(&label, inner), inner = inner)
}
