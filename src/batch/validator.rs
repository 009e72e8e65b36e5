//! Selection validation.

use crate::catalog::QueryCatalog;
use crate::error::{DeckError, Result};
use std::collections::BTreeSet;

/// Largest number of queries a single batch may run.
pub const MAX_SELECTED: usize = 5;

/// Validates a candidate selection and returns it in catalog order.
///
/// The input is treated as a set: duplicates collapse, and the order in
/// which ids were picked does not matter. Nothing is executed here.
pub fn validate_selection<I>(ids: I, catalog: &QueryCatalog) -> Result<Vec<usize>>
where
    I: IntoIterator<Item = usize>,
{
    let ids: BTreeSet<usize> = ids.into_iter().collect();

    if ids.is_empty() {
        return Err(DeckError::EmptySelection { max: MAX_SELECTED });
    }
    if ids.len() > MAX_SELECTED {
        return Err(DeckError::TooManySelected {
            count: ids.len(),
            max: MAX_SELECTED,
        });
    }
    if let Some(&unknown) = ids.iter().find(|&&id| id >= catalog.len()) {
        return Err(DeckError::UnknownQueryId(unknown));
    }

    Ok(ids.into_iter().collect())
}
