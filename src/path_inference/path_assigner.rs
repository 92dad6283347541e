//! Output path assignment
//!
//! Turns each column source into a concrete path such as `$[].id`,
//! `$.posts[].comments[].id` or `$.stats.total`. Joined aliases are always
//! siblings one level under the root; deeper nesting needs a hint.

use std::collections::HashMap;

use super::cardinality::CardinalityMap;
use super::column_sources::ColumnSource;
use crate::query_analyzer::{QueryShape, ROOT_HINT_ALIAS};

/// Assign one path per column source, in order.
///
/// `table_columns` maps table names to their column lists and is only consulted
/// when a bare column has to be attributed to one of several tables.
pub fn assign_paths(
    shape: &QueryShape,
    cardinality: &CardinalityMap,
    sources: &[ColumnSource],
    table_columns: &HashMap<String, Vec<String>>,
) -> Vec<String> {
    let paths: Vec<String> = sources
        .iter()
        .map(|source| {
            let alias = match source {
                ColumnSource::Qualified { alias, .. } => Some(alias.as_str()),
                ColumnSource::Bare(column) => guess_alias(shape, column, table_columns),
            };
            path_for(shape, cardinality, alias, source.column())
        })
        .collect();

    log::debug!("Assigned paths: {:?}", paths);
    paths
}

fn path_for(
    shape: &QueryShape,
    cardinality: &CardinalityMap,
    alias: Option<&str>,
    column: &str,
) -> String {
    let Some(alias) = alias else {
        // Expressions over no table at all
        return match cardinality.hint_for(ROOT_HINT_ALIAS) {
            Some(hint) => format!("{hint}.{column}"),
            None => format!("$.{column}"),
        };
    };

    if let Some(hint) = cardinality.hint_for(alias) {
        return hinted(hint, cardinality.is_array(alias), column);
    }

    // Without joins every unhinted alias lands flat at the root
    if shape.joins().is_empty() {
        return if cardinality.root_is_array() {
            format!("$[].{column}")
        } else {
            format!("$.{column}")
        };
    }

    let alias_segment = if cardinality.is_array(alias) {
        format!("{alias}[]")
    } else {
        alias.to_string()
    };

    match cardinality.root_hint() {
        Some(root_hint) => {
            let base = if cardinality.root_is_array() {
                array_of(root_hint)
            } else {
                root_hint.to_string()
            };
            format!("{base}.{alias_segment}.{column}")
        }
        None => {
            let base = if cardinality.root_is_array() { "$[]" } else { "$" };
            if cardinality.root_alias() == Some(alias) {
                format!("{base}.{alias}.{column}")
            } else {
                format!("{base}.{alias_segment}.{column}")
            }
        }
    }
}

/// `hint[].column` for arrays, `hint.column` otherwise. Never doubles `[]`.
fn hinted(hint: &str, is_array: bool, column: &str) -> String {
    if is_array {
        format!("{}.{column}", array_of(hint))
    } else {
        format!("{hint}.{column}")
    }
}

fn array_of(path: &str) -> String {
    if path.ends_with("[]") {
        path.to_string()
    } else {
        format!("{path}[]")
    }
}

/// Attribute a bare column to an alias.
///
/// The only table if there is one, else the first table (in declaration order)
/// whose column list contains the name, else the first table.
fn guess_alias<'a>(
    shape: &'a QueryShape,
    column: &str,
    table_columns: &HashMap<String, Vec<String>>,
) -> Option<&'a str> {
    let tables = shape.tables();
    if let [only] = tables {
        return Some(only.alias.as_str());
    }

    tables
        .iter()
        .find(|t| {
            table_columns
                .get(&t.table)
                .is_some_and(|columns| columns.iter().any(|c| c == column))
        })
        .or_else(|| tables.first())
        .map(|t| t.alias.as_str())
}
