//! FROM-list extraction: `FROM posts p, categories AS c`

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use super::common::{find_top_level, is_identifier, split_top_level, unquote_identifier};
use super::TableReference;

static FROM_KEYWORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bFROM\b").unwrap());

/// Keywords that end the FROM list
static FROM_LIST_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:WHERE|LEFT|RIGHT|INNER|OUTER|FULL|CROSS|NATURAL|JOIN|ORDER|GROUP|LIMIT|HAVING|UNION|OFFSET|WINDOW)\b",
    )
    .unwrap()
});

/// Clause keywords that can never be a table alias.
pub(crate) const CLAUSE_KEYWORDS: &[&str] = &[
    "WHERE", "LEFT", "RIGHT", "INNER", "OUTER", "FULL", "CROSS", "NATURAL", "JOIN", "ON",
    "ORDER", "GROUP", "LIMIT", "HAVING", "UNION", "OFFSET", "WINDOW", "USING",
];

pub(crate) fn is_clause_keyword(token: &str) -> bool {
    CLAUSE_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(token))
}

/// Result of scanning the top-level FROM clause
#[derive(Debug, Default)]
pub(crate) struct FromClause {
    /// Byte range of the `FROM` keyword itself
    pub keyword: Option<Range<usize>>,
    pub tables: Vec<TableReference>,
}

/// Find the first top-level `FROM` and register every table in its list.
pub(crate) fn extract_from_clause(sql: &str, profile: &[i32]) -> FromClause {
    let Some(keyword) = find_top_level(&FROM_KEYWORD, sql, profile, 0) else {
        return FromClause::default();
    };

    let list_start = keyword.end();
    let list_end = find_top_level(&FROM_LIST_END, sql, profile, list_start)
        .map(|m| m.start())
        .unwrap_or(sql.len());
    let list = sql[list_start..list_end].trim().trim_end_matches(';');

    let tables = split_top_level(list)
        .iter()
        .filter_map(|item| parse_table_item(item))
        .collect();

    FromClause {
        keyword: Some(keyword.range()),
        tables,
    }
}

/// Parse `table [AS] alias`. Derived tables (`(SELECT ...) x`) are opaque and skipped.
fn parse_table_item(item: &str) -> Option<TableReference> {
    let tokens: Vec<&str> = item.split_whitespace().collect();
    let first = *tokens.first()?;
    if first.starts_with('(') {
        return None;
    }

    let table = unquote_identifier(first).to_string();
    let candidate = match tokens.as_slice() {
        [_, as_kw, alias, ..] if as_kw.eq_ignore_ascii_case("AS") => Some(*alias),
        [_, alias, ..] if !alias.eq_ignore_ascii_case("AS") => Some(*alias),
        _ => None,
    };

    let alias = candidate
        .map(unquote_identifier)
        .filter(|alias| is_identifier(alias) && !is_clause_keyword(alias))
        .map(str::to_string)
        .unwrap_or_else(|| table.clone());

    Some(TableReference { alias, table })
}
