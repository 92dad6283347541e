//! Output column -> source alias, by position in the SELECT list

use crate::query_analyzer::{QueryShape, SelectExpr};

/// Where an output column comes from.
///
/// The column name is always the name the executor reported, so `p.id AS
/// post_id` yields `Qualified { alias: "p", column: "post_id" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    Qualified { alias: String, column: String },
    Bare(String),
}

impl ColumnSource {
    pub fn column(&self) -> &str {
        match self {
            ColumnSource::Qualified { column, .. } | ColumnSource::Bare(column) => column,
        }
    }
}

/// Match output columns to SELECT items by position.
///
/// A star item expands to an unknown number of columns, so positional
/// matching stops at the first one and every later column is bare.
pub fn column_sources(shape: &QueryShape, columns: &[String]) -> Vec<ColumnSource> {
    let mut items = shape.select_items().iter();
    let mut aligned = true;

    columns
        .iter()
        .map(|column| {
            let item = if aligned { items.next() } else { None };
            match item.map(|item| &item.expr) {
                Some(SelectExpr::Column { column: star, .. }) if star == "*" => {
                    aligned = false;
                    ColumnSource::Bare(column.clone())
                }
                Some(SelectExpr::Expression(text)) if text.trim() == "*" => {
                    aligned = false;
                    ColumnSource::Bare(column.clone())
                }
                Some(SelectExpr::Column { alias, .. }) if shape.has_alias(alias) => {
                    ColumnSource::Qualified {
                        alias: alias.clone(),
                        column: column.clone(),
                    }
                }
                _ => ColumnSource::Bare(column.clone()),
            }
        })
        .collect()
}
