//! Output path inference
//!
//! Decides where every output column lands in the result tree. Three modes:
//!
//! - explicit: some column alias is itself a `$` path, inference is skipped
//! - inferred: cardinality from joins and foreign keys, then path assignment
//! - fallback: no schema facts available, every column becomes `$[].column`

use std::collections::HashMap;

mod cardinality;
mod column_sources;
mod explicit_paths;
mod path_assigner;

pub use cardinality::{resolve_cardinality, CardinalityMap};
pub use column_sources::{column_sources, ColumnSource};
pub use explicit_paths::{explicit_paths, fallback_paths, has_explicit_paths};
pub use path_assigner::assign_paths;

use crate::query_analyzer::QueryShape;
use crate::schema_metadata::ForeignKey;

/// Schema facts inference runs against
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    pub foreign_keys: Vec<ForeignKey>,
    /// Table name -> column names. May be partial.
    pub columns: HashMap<String, Vec<String>>,
}

/// Infer one path per output column.
pub fn infer_paths(shape: &QueryShape, columns: &[String], schema: &SchemaSnapshot) -> Vec<String> {
    let cardinality = resolve_cardinality(shape, &schema.foreign_keys);
    let sources = column_sources(shape, columns);
    assign_paths(shape, &cardinality, &sources, &schema.columns)
}

/// Whether resolving bare columns needs per-table column lists.
pub fn needs_column_metadata(shape: &QueryShape, columns: &[String]) -> bool {
    shape.tables().len() > 1
        && column_sources(shape, columns)
            .iter()
            .any(|source| matches!(source, ColumnSource::Bare(_)))
}
