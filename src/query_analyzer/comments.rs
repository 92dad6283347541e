//! SQL comment stripping
//!
//! Path hints live in comments, so they are read from the raw text first.
//! Everything else in the analyzer works on the stripped text.

/// Remove `-- ...` line comments and `/* ... */` block comments.
///
/// Line comments end at the newline, which is kept. Block comments may span
/// lines and are replaced by a single space so the tokens around them stay
/// apart. Comment markers inside `'...'` literals and `"..."` or `` `...` ``
/// identifiers are left untouched.
/// An unterminated block comment swallows the rest of the input.
pub fn strip_comments(sql: &str) -> String {
    let mut result = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            result.push(ch);
            if ch == '\\' {
                if let Some(escaped) = chars.next() {
                    result.push(escaped);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' | '`' => {
                quote = Some(ch);
                result.push(ch);
            }
            '-' if chars.peek() == Some(&'-') => {
                // Skip to end of line, keep the newline itself
                for next in chars.by_ref() {
                    if next == '\n' {
                        result.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
                result.push(' ');
            }
            _ => result.push(ch),
        }
    }

    result
}
