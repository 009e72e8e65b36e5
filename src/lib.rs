//! querydeck - batch execution of catalog queries into one merged table.
//!
//! This library exposes the core modules for the binary and integration tests.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod output;
pub mod safety;
pub mod session;
