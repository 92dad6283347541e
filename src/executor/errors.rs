use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParameterError {
    #[error("Missing required parameter: {0}")]
    Missing(String),

    #[error("Unsupported value for parameter '{name}': {kind}")]
    UnsupportedType { name: String, kind: String },
}

#[derive(Debug, Error)]
pub enum QueryExecutionError {
    #[error("Parameter substitution failed: {0}")]
    Parameter(#[from] ParameterError),

    #[error("ClickHouse query failed: {0}")]
    ClickHouse(#[from] clickhouse::error::Error),

    #[error("Failed to read query response: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed response line {line}: {source}")]
    MalformedResponse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Query failed: {0}")]
    Backend(String),
}
