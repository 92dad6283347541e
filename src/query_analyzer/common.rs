//! Shared scanning helpers for the structural analyzer
//!
//! The analyzer never parses SQL. It looks at the text through two lenses:
//! a parenthesis-depth profile (so keywords inside subqueries are ignored) and
//! a comma splitter that respects nesting and quoting.

use regex::{Match, Regex};

/// Depth value recorded for bytes inside a quoted literal or identifier.
const QUOTED: i32 = -1;

/// Parenthesis depth at every byte offset of `sql`.
///
/// Bytes inside `'...'`, `"..."` or `` `...` `` are marked as quoted and never
/// count as top level, so a keyword spelled inside a string literal is not a
/// clause boundary.
pub(crate) fn depth_profile(sql: &str) -> Vec<i32> {
    let mut profile = vec![0; sql.len()];
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;

    for (idx, ch) in sql.char_indices() {
        let width = ch.len_utf8();
        let value = match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                QUOTED
            }
            None => match ch {
                '\'' | '"' | '`' => {
                    quote = Some(ch);
                    QUOTED
                }
                '(' => {
                    depth += 1;
                    depth
                }
                ')' => {
                    depth -= 1;
                    depth.max(0)
                }
                _ => depth.max(0),
            },
        };
        for slot in &mut profile[idx..idx + width] {
            *slot = value;
        }
    }

    profile
}

pub(crate) fn is_top_level(profile: &[i32], idx: usize) -> bool {
    profile.get(idx).copied().unwrap_or(0) == 0
}

/// First match of `pattern` at or after `from` that starts at top level.
pub(crate) fn find_top_level<'h>(
    pattern: &Regex,
    sql: &'h str,
    profile: &[i32],
    from: usize,
) -> Option<Match<'h>> {
    pattern
        .find_iter(sql)
        .find(|m| m.start() >= from && is_top_level(profile, m.start()))
}

/// Split on top-level commas, respecting nested parentheses and quoted text.
///
/// Pieces are trimmed. A trailing empty piece (e.g. from `a, b,`) is dropped.
pub(crate) fn split_top_level(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;

    for ch in text.chars() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '\'' | '"' | '`' => {
                quote = Some(ch);
                current.push(ch);
            }
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth <= 0 => {
                pieces.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let last = current.trim();
    if !last.is_empty() {
        pieces.push(last.to_string());
    }

    pieces
}

/// Strip one layer of identifier quoting: `"posts"`, `` `posts` ``.
pub(crate) fn unquote_identifier(name: &str) -> &str {
    let trimmed = name.trim();
    for quote in ['"', '`', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

pub(crate) fn is_identifier(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_alphanumeric() || c == '_')
}
