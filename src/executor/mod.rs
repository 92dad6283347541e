//! Query execution
//!
//! [`QueryExecutor`] is the seam between the reshaping pipeline and a
//! database. [`ClickHouseExecutor`] is the bundled implementation.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

pub mod clickhouse_client;
pub mod errors;
mod parameter_substitution;

pub use clickhouse_client::ClickHouseExecutor;
pub use errors::{ParameterError, QueryExecutionError};
pub use parameter_substitution::substitute_parameters;

/// Named parameter values, bound to `:name` placeholders
pub type QueryParams = HashMap<String, Value>;

/// One result cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Already typed by the driver
    Value(Value),
    /// Untyped bytes, typed later by content
    Raw(Vec<u8>),
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Cell::Value(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run `sql` with `params` and return every row.
    async fn execute(&self, sql: &str, params: &QueryParams)
        -> Result<QueryResult, QueryExecutionError>;
}
