//! SQL parsing and classification logic.
//!
//! Uses sqlparser-rs with the generic dialect, which accepts the common
//! subset of PostgreSQL, SQLite and SQL Server syntax used by catalogs.

use sqlparser::ast::{Query, Select, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::error::{DeckError, Result};

use super::{ClassificationResult, SafetyLevel, StatementType};

/// SQL classifier that parses and classifies SQL queries.
#[derive(Debug, Default)]
pub struct SqlClassifier {
    dialect: GenericDialect,
}

impl SqlClassifier {
    pub fn new() -> Self {
        Self {
            dialect: GenericDialect {},
        }
    }

    /// Classifies a SQL string, returning an error if it cannot be parsed.
    pub fn try_classify(&self, sql: &str) -> Result<ClassificationResult> {
        let statements = Parser::parse_sql(&self.dialect, sql)
            .map_err(|e| DeckError::query(format!("SQL parse error: {}", e)))?;

        match statements.as_slice() {
            [] => Ok(ClassificationResult::new(
                SafetyLevel::Destructive,
                StatementType::Unknown,
            )),
            [single] => {
                let (level, stmt_type) = classify_statement(single);
                Ok(ClassificationResult::new(level, stmt_type))
            }
            many => {
                // Multiple statements: use the most dangerous classification
                let (level, stmt_type) = many
                    .iter()
                    .map(classify_statement)
                    .fold((SafetyLevel::Safe, StatementType::Unknown), most_dangerous);
                Ok(ClassificationResult::new(
                    level,
                    StatementType::Multiple(Box::new(stmt_type)),
                ))
            }
        }
    }
}

fn most_dangerous(
    current: (SafetyLevel, StatementType),
    candidate: (SafetyLevel, StatementType),
) -> (SafetyLevel, StatementType) {
    if candidate.0.priority() > current.0.priority() {
        candidate
    } else {
        current
    }
}

/// Classifies a single parsed statement.
fn classify_statement(statement: &Statement) -> (SafetyLevel, StatementType) {
    match statement {
        // Query: may contain data-modifying CTEs, so recurse
        Statement::Query(query) => classify_query(query),
        Statement::Explain {
            analyze, statement, ..
        } => {
            if *analyze {
                // EXPLAIN ANALYZE executes the statement
                let (inner_level, _) = classify_statement(statement);
                (inner_level, StatementType::Explain)
            } else {
                (SafetyLevel::Safe, StatementType::Explain)
            }
        }
        Statement::ShowVariable { .. }
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowCreate { .. }
        | Statement::ShowFunctions { .. }
        | Statement::ShowStatus { .. }
        | Statement::ShowCollation { .. } => (SafetyLevel::Safe, StatementType::Show),

        Statement::Insert(_) => (SafetyLevel::Mutating, StatementType::Insert),
        Statement::Update { .. } => (SafetyLevel::Mutating, StatementType::Update),
        Statement::Merge { .. } => (SafetyLevel::Mutating, StatementType::Merge),

        Statement::Delete(_) => (SafetyLevel::Destructive, StatementType::Delete),
        Statement::Drop { .. } => (SafetyLevel::Destructive, StatementType::Drop),
        Statement::Truncate { .. } => (SafetyLevel::Destructive, StatementType::Truncate),
        Statement::AlterTable { .. }
        | Statement::AlterIndex { .. }
        | Statement::AlterView { .. }
        | Statement::AlterRole { .. } => (SafetyLevel::Destructive, StatementType::Alter),
        Statement::CreateTable { .. }
        | Statement::CreateIndex { .. }
        | Statement::CreateView { .. }
        | Statement::CreateSchema { .. }
        | Statement::CreateDatabase { .. }
        | Statement::CreateFunction { .. }
        | Statement::CreateProcedure { .. }
        | Statement::CreateRole { .. }
        | Statement::CreateSequence { .. }
        | Statement::CreateType { .. } => (SafetyLevel::Destructive, StatementType::Create),
        Statement::Grant { .. } => (SafetyLevel::Destructive, StatementType::Grant),
        Statement::Revoke { .. } => (SafetyLevel::Destructive, StatementType::Revoke),

        // Conservative default: treat unknown statements as destructive
        _ => (SafetyLevel::Destructive, StatementType::Unknown),
    }
}

/// Classifies a Query, including any CTEs in its WITH clause.
fn classify_query(query: &Query) -> (SafetyLevel, StatementType) {
    let mut result = (SafetyLevel::Safe, StatementType::Select);

    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            result = most_dangerous(result, classify_query(&cte.query));
        }
    }

    most_dangerous(result, classify_set_expr(&query.body))
}

/// Classifies a SetExpr, detecting mutations and recursing into nested queries.
fn classify_set_expr(set_expr: &SetExpr) -> (SafetyLevel, StatementType) {
    match set_expr {
        SetExpr::Insert(stmt) | SetExpr::Update(stmt) => classify_statement(stmt),
        SetExpr::Query(query) => classify_query(query),
        SetExpr::Select(select) => classify_select(select),
        SetExpr::SetOperation { left, right, .. } => {
            most_dangerous(classify_set_expr(left), classify_set_expr(right))
        }
        SetExpr::Values(_) | SetExpr::Table(_) => (SafetyLevel::Safe, StatementType::Select),
        // Any other body (e.g. a DELETE used as a CTE) modifies data.
        #[allow(unreachable_patterns)]
        _ => (SafetyLevel::Destructive, StatementType::Unknown),
    }
}

/// Classifies a Select by checking its FROM clause for subqueries.
fn classify_select(select: &Select) -> (SafetyLevel, StatementType) {
    select
        .from
        .iter()
        .map(classify_table_with_joins)
        .fold((SafetyLevel::Safe, StatementType::Select), most_dangerous)
}

/// Classifies a TableWithJoins, checking the main relation and all joins.
fn classify_table_with_joins(twj: &TableWithJoins) -> (SafetyLevel, StatementType) {
    twj.joins
        .iter()
        .map(|join| classify_table_factor(&join.relation))
        .fold(classify_table_factor(&twj.relation), most_dangerous)
}

/// Classifies a TableFactor, recursing into derived tables (subqueries).
fn classify_table_factor(factor: &TableFactor) -> (SafetyLevel, StatementType) {
    match factor {
        TableFactor::Derived { subquery, .. } => classify_query(subquery),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => classify_table_with_joins(table_with_joins),
        _ => (SafetyLevel::Safe, StatementType::Select),
    }
}
