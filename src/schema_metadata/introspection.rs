//! Per-backend introspection queries
//!
//! Every query returns plain text columns so it can run through any
//! [`QueryExecutor`](crate::executor::QueryExecutor). Table names are bound
//! through the `:table` parameter.

use serde_json::Value;

use super::errors::MetadataError;
use super::ForeignKey;
use crate::executor::{Cell, QueryResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    MySql,
    Postgres,
    ClickHouse,
}

impl Backend {
    pub fn from_driver(driver: &str) -> Result<Self, MetadataError> {
        match driver.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Backend::MySql),
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "clickhouse" => Ok(Backend::ClickHouse),
            _ => Err(MetadataError::UnsupportedBackend {
                driver: driver.to_string(),
            }),
        }
    }

    /// Column names of `:table`, in ordinal order
    pub fn columns_sql(self) -> &'static str {
        match self {
            Backend::MySql => {
                "SELECT COLUMN_NAME FROM information_schema.COLUMNS \
                 WHERE TABLE_NAME = :table AND TABLE_SCHEMA = DATABASE() \
                 ORDER BY ORDINAL_POSITION"
            }
            Backend::Postgres => {
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_name = :table AND table_schema = 'public' \
                 ORDER BY ordinal_position"
            }
            Backend::ClickHouse => {
                "SELECT name FROM system.columns \
                 WHERE database = currentDatabase() AND table = :table \
                 ORDER BY position"
            }
        }
    }

    /// Primary key columns of `:table`
    pub fn primary_keys_sql(self) -> &'static str {
        match self {
            Backend::MySql => {
                "SELECT COLUMN_NAME FROM information_schema.KEY_COLUMN_USAGE \
                 WHERE TABLE_NAME = :table AND CONSTRAINT_NAME = 'PRIMARY' \
                 AND TABLE_SCHEMA = DATABASE() \
                 ORDER BY ORDINAL_POSITION"
            }
            Backend::Postgres => {
                "SELECT kcu.column_name \
                 FROM information_schema.table_constraints tc \
                 JOIN information_schema.key_column_usage kcu \
                   ON tc.constraint_name = kcu.constraint_name \
                  AND tc.table_schema = kcu.table_schema \
                 WHERE tc.constraint_type = 'PRIMARY KEY' \
                   AND tc.table_name = :table AND tc.table_schema = 'public' \
                 ORDER BY kcu.ordinal_position"
            }
            Backend::ClickHouse => {
                "SELECT name FROM system.columns \
                 WHERE database = currentDatabase() AND table = :table \
                   AND is_in_primary_key = 1 \
                 ORDER BY position"
            }
        }
    }

    /// All foreign keys of the current schema as
    /// (from_table, from_column, to_table, to_column). ClickHouse has none.
    pub fn foreign_keys_sql(self) -> Option<&'static str> {
        match self {
            Backend::MySql => Some(
                "SELECT TABLE_NAME, COLUMN_NAME, REFERENCED_TABLE_NAME, REFERENCED_COLUMN_NAME \
                 FROM information_schema.KEY_COLUMN_USAGE \
                 WHERE REFERENCED_TABLE_NAME IS NOT NULL AND TABLE_SCHEMA = DATABASE()",
            ),
            Backend::Postgres => Some(
                "SELECT tc.table_name, kcu.column_name, \
                        ccu.table_name AS foreign_table_name, \
                        ccu.column_name AS foreign_column_name \
                 FROM information_schema.table_constraints AS tc \
                 JOIN information_schema.key_column_usage AS kcu \
                   ON tc.constraint_name = kcu.constraint_name \
                  AND tc.table_schema = kcu.table_schema \
                 JOIN information_schema.constraint_column_usage AS ccu \
                   ON ccu.constraint_name = tc.constraint_name \
                  AND ccu.table_schema = tc.table_schema \
                 WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = 'public'",
            ),
            Backend::ClickHouse => None,
        }
    }
}

fn cell_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Value(Value::String(text)) => Some(text.clone()),
        Cell::Raw(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

fn row_texts(what: &str, row: &[Cell], width: usize) -> Result<Vec<String>, MetadataError> {
    if row.len() < width {
        return Err(MetadataError::MalformedRow {
            what: what.to_string(),
            message: format!("expected {} columns, got {}", width, row.len()),
        });
    }
    row[..width]
        .iter()
        .map(|cell| {
            cell_text(cell).ok_or_else(|| MetadataError::MalformedRow {
                what: what.to_string(),
                message: format!("expected text, got {:?}", cell),
            })
        })
        .collect()
}

/// First column of every row as text
pub fn decode_names(what: &str, result: QueryResult) -> Result<Vec<String>, MetadataError> {
    result
        .rows
        .iter()
        .map(|row| row_texts(what, row, 1).map(|mut texts| texts.remove(0)))
        .collect()
}

pub fn decode_foreign_keys(result: QueryResult) -> Result<Vec<ForeignKey>, MetadataError> {
    result
        .rows
        .iter()
        .map(|row| {
            let [from_table, from_column, to_table, to_column]: [String; 4] =
                row_texts("foreign key", row, 4)?
                    .try_into()
                    .map_err(|_| MetadataError::MalformedRow {
                        what: "foreign key".to_string(),
                        message: "expected 4 columns".to_string(),
                    })?;
            Ok(ForeignKey {
                from_table,
                from_column,
                to_table,
                to_column,
            })
        })
        .collect()
}
