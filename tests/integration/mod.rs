//! Integration tests for querydeck.

pub mod batch_test;
pub mod config_test;
pub mod postgres_test;
pub mod sqlite_test;
