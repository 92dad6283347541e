//! Executed rows -> flat path/value records

use serde_json::{Number, Value};

use super::errors::TreeError;
use crate::executor::Cell;

/// One row as ordered `(key, value)` pairs.
///
/// Keys are output paths without the leading `$`, and without a trailing `[]`
/// on the final segment: `$.posts[].comments[].id` -> `.posts[].comments[].id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    entries: Vec<(String, Value)>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated key is overwritten in place, keeping its first position.
    pub fn insert(&mut self, key: String, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Record key for an output path.
pub fn record_key(path: &str) -> String {
    let key = path.strip_prefix('$').unwrap_or(path);
    let final_start = key.rfind('.').map(|dot| dot + 1).unwrap_or(0);
    match key[final_start..].strip_suffix("[]") {
        Some(name) => format!("{}{}", &key[..final_start], name),
        None => key.to_string(),
    }
}

/// Zip every row with `paths` into a [`FlatRecord`].
pub fn collect_records(paths: &[String], rows: Vec<Vec<Cell>>) -> Result<Vec<FlatRecord>, TreeError> {
    let keys: Vec<String> = paths.iter().map(|p| record_key(p)).collect();

    rows.into_iter()
        .enumerate()
        .map(|(row_idx, row)| {
            if row.len() != keys.len() {
                return Err(TreeError::RowWidthMismatch {
                    row: row_idx,
                    cells: row.len(),
                    paths: keys.len(),
                });
            }
            let mut record = FlatRecord::new();
            for (key, cell) in keys.iter().zip(row) {
                let value = match cell {
                    Cell::Value(value) => value,
                    Cell::Raw(bytes) => normalize_raw_cell(&bytes),
                };
                record.insert(key.clone(), value);
            }
            Ok(record)
        })
        .collect()
}

/// Give an untyped cell a JSON type.
///
/// Integer when the text is exactly the canonical form of an `i64`, float when
/// it contains `.` and parses to a finite number, text otherwise.
pub fn normalize_raw_cell(bytes: &[u8]) -> Value {
    let text = String::from_utf8_lossy(bytes);

    if let Ok(int) = text.parse::<i64>() {
        if int.to_string() == text {
            return Value::Number(int.into());
        }
    }

    if text.contains('.') {
        if let Some(number) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }

    Value::String(text.into_owned())
}
