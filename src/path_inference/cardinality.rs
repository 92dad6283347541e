//! Per-alias cardinality: does an alias contribute one object or many?
//!
//! Resolved from the join graph plus foreign-key facts. The root alias (the
//! first declared alias that is never the right side of a join) is decided by
//! its hint and the presence of joins; every joined alias by the direction of
//! the foreign key behind its ON predicates.

use std::collections::HashMap;

use crate::query_analyzer::{JoinEdge, JoinKind, QueryShape, ROOT_HINT_ALIAS};
use crate::schema_metadata::ForeignKey;

/// Alias -> "is array", with the detected root and the effective hint map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardinalityMap {
    root_alias: Option<String>,
    flags: HashMap<String, bool>,
    hints: HashMap<String, String>,
}

impl CardinalityMap {
    /// Aliases that were never resolved read as objects.
    pub fn is_array(&self, alias: &str) -> bool {
        self.flags.get(alias).copied().unwrap_or(false)
    }

    pub fn root_alias(&self) -> Option<&str> {
        self.root_alias.as_deref()
    }

    /// Arrays are the default shape of a result, so a query with no root is one.
    pub fn root_is_array(&self) -> bool {
        self.root_alias
            .as_deref()
            .map(|root| self.is_array(root))
            .unwrap_or(true)
    }

    /// Hint after the `$` hint has been moved onto the root alias
    pub fn hint_for(&self, alias: &str) -> Option<&str> {
        self.hints.get(alias).map(String::as_str)
    }

    pub fn root_hint(&self) -> Option<&str> {
        self.root_alias().and_then(|root| self.hint_for(root))
    }
}

/// Resolve the cardinality of every alias in `shape`.
pub fn resolve_cardinality(shape: &QueryShape, foreign_keys: &[ForeignKey]) -> CardinalityMap {
    let mut hints = shape.hints().clone();
    let mut flags = HashMap::new();

    let mut root_alias = shape
        .tables()
        .iter()
        .find(|t| shape.join_for_alias(&t.alias).is_none())
        .map(|t| t.alias.clone());

    if let Some(root_hint) = shape.hint_for(ROOT_HINT_ALIAS) {
        let root = root_alias.get_or_insert_with(|| ROOT_HINT_ALIAS.to_string());
        hints.insert(root.clone(), root_hint.to_string());
    }

    if let Some(root) = &root_alias {
        let is_array = match hints.get(root) {
            Some(hint) if hint.ends_with("[]") => true,
            Some(hint) if hint == ROOT_HINT_ALIAS => false,
            Some(_) => !shape.joins().is_empty(),
            None => true,
        };
        flags.insert(root.clone(), is_array);
    }

    for join in shape.joins() {
        flags.insert(join.right_alias.clone(), join_is_one_to_many(join, foreign_keys));
    }

    // Comma-joined tables have no ON clause to go on
    for table in shape.tables() {
        flags.entry(table.alias.clone()).or_insert(true);
    }

    log::debug!("Cardinality: root={:?}, flags={:?}", root_alias, flags);

    CardinalityMap {
        root_alias,
        flags,
        hints,
    }
}

/// Whether the right side of `join` holds many rows per left row.
///
/// A foreign key from the right table to the left table, on one of the
/// predicate columns, makes the join one-to-many. The reverse direction makes it
/// many-to-one. Without either, only LEFT joins read as one-to-many.
fn join_is_one_to_many(join: &JoinEdge, foreign_keys: &[ForeignKey]) -> bool {
    let names_column = |alias: &str, column: &str| {
        join.predicates.iter().any(|p| {
            (p.left_alias == alias && p.left_column == column)
                || (p.right_alias == alias && p.right_column == column)
        })
    };

    let one_to_many = foreign_keys.iter().any(|fk| {
        fk.from_table == join.right_table
            && fk.to_table == join.left_table
            && names_column(&join.right_alias, &fk.from_column)
    });
    if one_to_many {
        return true;
    }

    let many_to_one = foreign_keys.iter().any(|fk| {
        fk.from_table == join.left_table
            && fk.to_table == join.right_table
            && names_column(&join.left_alias, &fk.from_column)
    });
    if many_to_one {
        return false;
    }

    join.kind == JoinKind::Left
}
