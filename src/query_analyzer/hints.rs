//! Path hints embedded in SQL comments
//!
//! ```sql
//! SELECT p.id, c.id FROM posts p LEFT JOIN comments c ON c.post_id = p.id
//! -- PATH p $.posts
//! -- PATH: c $.posts[].replies
//! ```
//!
//! A hint names a table alias (or `$` for output that has no table behind it)
//! and the path its columns should land under. Hints that do not match the
//! pattern are ignored, never reported.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Alias used by hints that apply to the output root rather than a table.
pub const ROOT_HINT_ALIAS: &str = "$";

/// Captures: (1) alias or `$`, (2) path template starting with `$`
static PATH_HINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"--\s*PATH:?\s+(\$|\w+)\s+(\$[\w\[\]\.\*]*)").unwrap()
});

/// Extract `-- PATH[:] <alias|$> <path>` hints from raw SQL.
///
/// Later hints for the same alias overwrite earlier ones.
pub fn extract_path_hints(sql: &str) -> HashMap<String, String> {
    let mut hints = HashMap::new();
    for caps in PATH_HINT_PATTERN.captures_iter(sql) {
        hints.insert(caps[1].to_string(), caps[2].to_string());
    }
    hints
}
