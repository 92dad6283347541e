//! JOIN extraction
//!
//! Matches `[kind] JOIN <table> [[AS] <alias>] ON <condition>` at the top level
//! of the statement. The condition runs to the next JOIN header or clause
//! keyword. Only `a.x = b.y` equalities are pulled out of it; anything else in
//! the condition is kept as raw text and otherwise ignored.

use regex::Regex;
use std::sync::LazyLock;

use super::common::{find_top_level, is_top_level, unquote_identifier};
use super::{EqualityPredicate, JoinEdge, JoinKind, TableReference};

/// Captures: (1) LEFT/RIGHT/FULL, (2) INNER/OUTER/CROSS, (3) table, (4) alias
static JOIN_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(LEFT|RIGHT|FULL)(?:\s+OUTER)?\s+|(INNER|OUTER|CROSS)\s+)?JOIN\s+([\w.`\x22]+)(?:\s+(?:AS\s+)?(\w+))?\s+ON\s+",
    )
    .unwrap()
});

static CONDITION_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:WHERE|GROUP|ORDER|LIMIT|HAVING|UNION|OFFSET|WINDOW)\b").unwrap()
});

/// Captures: (1) left alias, (2) left column, (3) right alias, (4) right column
static EQUALITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\.(\w+)\s*=\s*(\w+)\.(\w+)").unwrap());

impl JoinKind {
    fn from_captures(side: Option<&str>, plain: Option<&str>) -> Self {
        let keyword = side.or(plain).map(|k| k.to_ascii_uppercase());
        match keyword.as_deref() {
            Some("LEFT") => JoinKind::Left,
            Some("RIGHT") => JoinKind::Right,
            Some("FULL") | Some("OUTER") => JoinKind::Outer,
            Some("CROSS") => JoinKind::Cross,
            _ => JoinKind::Inner,
        }
    }
}

/// Extract every top-level JOIN, registering joined aliases into `tables`.
pub(crate) fn extract_joins(
    sql: &str,
    profile: &[i32],
    tables: &mut Vec<TableReference>,
) -> Vec<JoinEdge> {
    let headers: Vec<_> = JOIN_HEADER
        .captures_iter(sql)
        .filter(|caps| caps.get(0).is_some_and(|m| is_top_level(profile, m.start())))
        .collect();

    let mut joins = Vec::with_capacity(headers.len());

    for (idx, caps) in headers.iter().enumerate() {
        let Some(header) = caps.get(0) else { continue };

        let kind = JoinKind::from_captures(
            caps.get(1).map(|m| m.as_str()),
            caps.get(2).map(|m| m.as_str()),
        );
        let table = unquote_identifier(&caps[3]).to_string();
        let alias = caps
            .get(4)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| table.clone());

        // Condition: up to the next JOIN header, then cut at the first clause keyword
        let next_header = headers
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(sql.len());
        let condition_end = find_top_level(&CONDITION_END, sql, profile, header.end())
            .map(|m| m.start())
            .filter(|end| *end < next_header)
            .unwrap_or(next_header);
        let condition = sql[header.end()..condition_end].trim().to_string();

        let predicates = parse_join_condition(&condition);
        let left_alias = predicates
            .iter()
            .find_map(|p| {
                if p.right_alias == alias {
                    Some(p.left_alias.clone())
                } else if p.left_alias == alias {
                    Some(p.right_alias.clone())
                } else {
                    None
                }
            })
            .or_else(|| {
                // No predicate names the new alias: fall back to the first earlier alias
                tables
                    .iter()
                    .find(|t| t.alias != alias)
                    .map(|t| t.alias.clone())
            })
            .unwrap_or_default();
        let left_table = tables
            .iter()
            .find(|t| t.alias == left_alias)
            .map(|t| t.table.clone())
            .unwrap_or_default();

        register_table(tables, &alias, &table);

        log::trace!(
            "join {:?} {} ({}) -> {} ({}) on `{}`",
            kind,
            left_alias,
            left_table,
            alias,
            table,
            condition
        );

        joins.push(JoinEdge {
            left_alias,
            left_table,
            right_alias: alias,
            right_table: table,
            kind,
            predicates,
            condition,
        });
    }

    joins
}

/// Pull `alias.column = alias.column` equalities out of an ON condition.
///
/// `p.id = c.post_id` -> left `p.id`, right `c.post_id`
pub(crate) fn parse_join_condition(condition: &str) -> Vec<EqualityPredicate> {
    EQUALITY
        .captures_iter(condition)
        .map(|caps| EqualityPredicate {
            left_alias: caps[1].to_string(),
            left_column: caps[2].to_string(),
            right_alias: caps[3].to_string(),
            right_column: caps[4].to_string(),
        })
        .collect()
}

fn register_table(tables: &mut Vec<TableReference>, alias: &str, table: &str) {
    match tables.iter_mut().find(|t| t.alias == alias) {
        Some(existing) => existing.table = table.to_string(),
        None => tables.push(TableReference {
            alias: alias.to_string(),
            table: table.to_string(),
        }),
    }
}
