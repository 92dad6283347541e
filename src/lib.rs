//! pathsql - nested JSON from flat SQL results
//!
//! This crate reshapes the rows of a SQL query into a JSON tree:
//! - Best-effort structural analysis of the SQL text
//! - Array/object inference from joins, foreign keys and `-- PATH` hints
//! - Fingerprint-based merging of join fan-out into nested arrays
//! - ClickHouse execution and schema introspection

pub mod client;
pub mod config;
pub mod executor;
pub mod path_inference;
pub mod query_analyzer;
pub mod result_tree;
pub mod schema_metadata;

pub use client::{PathQueryError, PathSqlClient};
