use thiserror::Error;

use crate::executor::QueryExecutionError;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Unsupported metadata backend: {driver} (expected mysql, postgres or clickhouse)")]
    UnsupportedBackend { driver: String },

    #[error("Failed to query {what}: {source}")]
    Query {
        what: String,
        #[source]
        source: QueryExecutionError,
    },

    #[error("Malformed {what} row: {message}")]
    MalformedRow { what: String, message: String },
}
