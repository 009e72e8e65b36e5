//! Batch pipeline: validate a selection, run it, merge the results.
//!
//! A batch is a set of catalog queries run in catalog order on one data-source
//! session. Either every query succeeds and a merged `BatchResult` comes back,
//! or the first failure is returned and nothing else is.

mod executor;
mod merger;
mod validator;

pub use executor::BatchExecutor;
pub use merger::{
    is_separator, merge_results, separator_label, separator_row, BatchResult, CapturedResult,
    ResultMerger, SchemaPolicy,
};
pub use validator::{validate_selection, MAX_SELECTED};
