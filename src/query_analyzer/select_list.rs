//! SELECT-list classification
//!
//! Output columns are matched to SELECT items by position, so the analyzer
//! records every top-level item and whether it is a plain `alias.column`
//! reference, a bare column name, or an opaque expression.

use regex::Regex;
use std::sync::LazyLock;

use super::common::{depth_profile, find_top_level, is_identifier, split_top_level, unquote_identifier};

static SELECT_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSELECT\b").unwrap());

static SET_QUANTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:DISTINCT|ALL)\s+").unwrap());

static AS_KEYWORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+AS\s+").unwrap());

/// Captures: (1) alias, (2) column or `*`
static QUALIFIED_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^["`]?(\w+)["`]?\.["`]?(\w+|\*)["`]?$"#).unwrap());

/// What a SELECT item computes
#[derive(Debug, Clone, PartialEq)]
pub enum SelectExpr {
    /// `alias.column` (or `alias.*`)
    Column { alias: String, column: String },
    /// A bare column name
    Bare(String),
    /// Anything else: function calls, subqueries, literals, arithmetic
    Expression(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: SelectExpr,
    /// `AS` alias (or implicit alias), unquoted
    pub output_alias: Option<String>,
}

/// Classify the items between the first top-level SELECT and `from_start`.
pub(crate) fn extract_select_items(
    sql: &str,
    profile: &[i32],
    from_start: Option<usize>,
) -> Vec<SelectItem> {
    let Some(select) = find_top_level(&SELECT_KEYWORD, sql, profile, 0) else {
        return Vec::new();
    };
    let end = from_start
        .filter(|start| *start >= select.end())
        .unwrap_or(sql.len());
    let list = SET_QUANTIFIER.replace(sql[select.end()..end].trim(), "");

    split_top_level(&list)
        .iter()
        .map(|item| classify_item(item))
        .collect()
}

fn classify_item(item: &str) -> SelectItem {
    let (expr_text, output_alias) = split_output_alias(item);
    let expr_text = expr_text.trim();

    let expr = if let Some(caps) = QUALIFIED_COLUMN.captures(expr_text) {
        SelectExpr::Column {
            alias: caps[1].to_string(),
            column: caps[2].to_string(),
        }
    } else if is_identifier(unquote_identifier(expr_text)) {
        SelectExpr::Bare(unquote_identifier(expr_text).to_string())
    } else {
        SelectExpr::Expression(expr_text.to_string())
    };

    SelectItem {
        expr,
        output_alias: output_alias.map(|a| unquote_identifier(a).to_string()),
    }
}

/// Split `expr AS alias` at the last top-level AS, or `expr alias` for an implicit alias.
fn split_output_alias(item: &str) -> (&str, Option<&str>) {
    let profile = depth_profile(item);
    let last_as = AS_KEYWORD
        .find_iter(item)
        .filter(|m| profile.get(m.start()).copied().unwrap_or(0) == 0)
        .last();
    if let Some(m) = last_as {
        return (&item[..m.start()], Some(item[m.end()..].trim()));
    }

    let tokens: Vec<&str> = item.split_whitespace().collect();
    if let [expr, alias] = tokens.as_slice() {
        let unquoted = unquote_identifier(alias);
        if is_identifier(unquoted) && !expr.ends_with(|c: char| "+-*/%=<>|".contains(c)) {
            return (expr, Some(alias));
        }
    }

    (item, None)
}
