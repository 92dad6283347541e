//! Best-effort structural analysis of SQL text
//!
//! Extracts what path inference needs from a query without parsing it:
//!
//! - path hints from `-- PATH` comments
//! - tables and aliases from the top-level FROM list
//! - JOIN edges with their `a.x = b.y` predicates
//! - the top-level SELECT items, in order
//!
//! Analysis never fails. Constructs it does not recognize (CTEs, unions,
//! derived tables, `USING` joins) are simply left out of the result, and
//! subqueries are treated as opaque expressions.

use std::collections::HashMap;

mod comments;
mod common;
mod from_clause;
mod hints;
mod joins;
mod select_list;

pub use comments::strip_comments;
pub use hints::{extract_path_hints, ROOT_HINT_ALIAS};
pub use select_list::{SelectExpr, SelectItem};

/// An alias bound to a table within one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReference {
    pub alias: String,
    pub table: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    /// LEFT and LEFT OUTER
    Left,
    /// RIGHT and RIGHT OUTER
    Right,
    /// FULL, FULL OUTER and bare OUTER
    Outer,
    Cross,
}

/// `left_alias.left_column = right_alias.right_column`, in the order written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityPredicate {
    pub left_alias: String,
    pub left_column: String,
    pub right_alias: String,
    pub right_column: String,
}

/// One JOIN of the query. The right side is always the joined table.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinEdge {
    /// Empty when no earlier alias could be identified
    pub left_alias: String,
    pub left_table: String,
    pub right_alias: String,
    pub right_table: String,
    pub kind: JoinKind,
    pub predicates: Vec<EqualityPredicate>,
    /// Raw ON condition text
    pub condition: String,
}

/// Immutable result of analyzing one SQL statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryShape {
    tables: Vec<TableReference>,
    joins: Vec<JoinEdge>,
    hints: HashMap<String, String>,
    select_items: Vec<SelectItem>,
}

impl QueryShape {
    /// Tables in declaration order: FROM items first, then joined tables.
    pub fn tables(&self) -> &[TableReference] {
        &self.tables
    }

    pub fn joins(&self) -> &[JoinEdge] {
        &self.joins
    }

    /// Alias (or `$`) -> path template
    pub fn hints(&self) -> &HashMap<String, String> {
        &self.hints
    }

    pub fn select_items(&self) -> &[SelectItem] {
        &self.select_items
    }

    pub fn table_for_alias(&self, alias: &str) -> Option<&str> {
        self.tables
            .iter()
            .find(|t| t.alias == alias)
            .map(|t| t.table.as_str())
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.tables.iter().any(|t| t.alias == alias)
    }

    pub fn join_for_alias(&self, alias: &str) -> Option<&JoinEdge> {
        self.joins.iter().find(|j| j.right_alias == alias)
    }

    pub fn hint_for(&self, alias: &str) -> Option<&str> {
        self.hints.get(alias).map(String::as_str)
    }
}

/// Analyze SQL text. Never fails.
///
/// # Example
/// ```
/// use pathsql::query_analyzer::{analyze_query, JoinKind};
///
/// let shape = analyze_query(
///     "SELECT p.id, c.id FROM posts p LEFT JOIN comments c ON c.post_id = p.id -- PATH p $.posts",
/// );
/// assert_eq!(shape.table_for_alias("c"), Some("comments"));
/// assert_eq!(shape.joins()[0].kind, JoinKind::Left);
/// assert_eq!(shape.hint_for("p"), Some("$.posts"));
/// ```
pub fn analyze_query(sql: &str) -> QueryShape {
    // Hints live in comments, so read them before stripping
    let hints = extract_path_hints(sql);

    let stripped = strip_comments(sql);
    let profile = common::depth_profile(&stripped);

    let from = from_clause::extract_from_clause(&stripped, &profile);
    let mut tables = from.tables;
    let joins = joins::extract_joins(&stripped, &profile, &mut tables);
    let select_items = select_list::extract_select_items(
        &stripped,
        &profile,
        from.keyword.map(|range| range.start),
    );

    let shape = QueryShape {
        tables,
        joins,
        hints,
        select_items,
    };

    log::debug!(
        "Analyzed query: tables={:?}, joins={}, hints={:?}, select_items={}",
        shape
            .tables
            .iter()
            .map(|t| format!("{} AS {}", t.table, t.alias))
            .collect::<Vec<_>>(),
        shape.joins.len(),
        shape.hints,
        shape.select_items.len()
    );

    shape
}
