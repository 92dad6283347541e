//! Client-side named parameters
//!
//! `:name` placeholders are replaced with escaped SQL literals before the text
//! is sent. Placeholders are only recognized in plain SQL text: string
//! literals, quoted identifiers and comments are copied through untouched, and
//! `::` casts are not placeholders.

use serde_json::Value;
use std::collections::HashMap;

use super::errors::ParameterError;

/// Escape for a single-quoted ClickHouse string literal.
fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\0' => escaped.push_str("\\0"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render a JSON value as an SQL literal.
fn render_value(name: &str, value: &Value) -> Result<String, ParameterError> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(flag) => Ok(if *flag { "1" } else { "0" }.to_string()),
        Value::Number(number) => match number.as_f64() {
            _ if number.is_i64() || number.is_u64() => Ok(number.to_string()),
            Some(float) if float.is_finite() => Ok(float.to_string()),
            _ => Err(ParameterError::UnsupportedType {
                name: name.to_string(),
                kind: format!("non-finite number {number}"),
            }),
        },
        Value::String(text) => Ok(format!("'{}'", escape_literal(text))),
        Value::Array(items) => {
            let rendered = items
                .iter()
                .map(|item| render_value(name, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("[{}]", rendered.join(", ")))
        }
        Value::Object(_) => Err(ParameterError::UnsupportedType {
            name: name.to_string(),
            kind: "object".to_string(),
        }),
    }
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Replace every `:name` placeholder in `sql` with its rendered value.
///
/// # Example
/// ```
/// use pathsql::executor::substitute_parameters;
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// let mut params = HashMap::new();
/// params.insert("title".to_string(), json!("O'Brien"));
/// let sql = substitute_parameters("SELECT id FROM posts WHERE title = :title", &params).unwrap();
/// assert_eq!(sql, "SELECT id FROM posts WHERE title = 'O\\'Brien'");
/// ```
pub fn substitute_parameters(
    sql: &str,
    params: &HashMap<String, Value>,
) -> Result<String, ParameterError> {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '\'' | '"' | '`' => {
                // Copy the quoted run, honoring backslash escapes
                out.push(ch);
                i += 1;
                while i < chars.len() {
                    out.push(chars[i]);
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        out.push(chars[i + 1]);
                        i += 2;
                        continue;
                    }
                    i += 1;
                    if chars[i - 1] == ch {
                        break;
                    }
                }
            }
            '-' if chars.get(i + 1) == Some(&'-') => {
                while i < chars.len() && chars[i] != '\n' {
                    out.push(chars[i]);
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                out.push_str("/*");
                i += 2;
                while i < chars.len() {
                    if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                        out.push_str("*/");
                        i += 2;
                        break;
                    }
                    out.push(chars[i]);
                    i += 1;
                }
            }
            ':' if chars.get(i + 1) == Some(&':') => {
                out.push_str("::");
                i += 2;
            }
            ':' if chars.get(i + 1).copied().is_some_and(is_name_start) => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_name_char(chars[end]) {
                    end += 1;
                }
                let name: String = chars[start..end].iter().collect();
                let value = params
                    .get(&name)
                    .ok_or_else(|| ParameterError::Missing(name.clone()))?;
                out.push_str(&render_value(&name, value)?);
                i = end;
            }
            _ => {
                out.push(ch);
                i += 1;
            }
        }
    }

    Ok(out)
}
