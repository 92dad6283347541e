//! Explicit column paths
//!
//! A query can name its output paths directly through column aliases:
//!
//! ```sql
//! SELECT posts.id AS "$.posts[].id", comments.id AS "$.posts[].comments[].id", body
//! ```
//!
//! Each `$`-column sets the current prefix (everything before its last `.`)
//! and plain columns that follow land under the same prefix. Before any
//! `$`-column the prefix is `$[]`.

const INITIAL_PREFIX: &str = "$[]";

pub fn has_explicit_paths(columns: &[String]) -> bool {
    columns.iter().any(|c| c.starts_with('$'))
}

/// Carry-forward path assignment over the output column names.
pub fn explicit_paths(columns: &[String]) -> Vec<String> {
    let mut prefix = INITIAL_PREFIX;
    columns
        .iter()
        .map(|column| {
            let mut property = column.as_str();
            if column.starts_with('$') {
                if let Some(dot) = column.rfind('.') {
                    prefix = &column[..dot];
                    property = &column[dot + 1..];
                }
            }
            format!("{prefix}.{property}")
        })
        .collect()
}

/// `$[].column` for every column, used when inference has nothing to go on.
pub fn fallback_paths(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|column| format!("{INITIAL_PREFIX}.{column}"))
        .collect()
}
