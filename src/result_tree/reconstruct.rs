//! Flat records -> one nested tree
//!
//! Every record key is cut at its `[]` markers. Each cut becomes a bucket
//! keyed by the fingerprint of that array element's direct leaves, so the
//! parent columns repeated by join fan-out fold into a single element:
//!
//! ```text
//! [].id=1 [].comments[].id=1      $[]#a -> id=1, comments[]#x -> id=1
//! [].id=1 [].comments[].id=2  =>            comments[]#y -> id=2
//! ```
//!
//! All records are merged into one [`MergeNode`] tree which then resolves to
//! JSON. A parent that ends up with both array elements and named fields, or a
//! path that must be both a scalar and a container, is a shape conflict.

use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use super::errors::{ConflictKind, TreeError};
use super::fingerprint::Fingerprint;
use super::row_collector::FlatRecord;

const ARRAY_MARKER: &str = "[]";

/// Insertion-ordered map used for branch children.
#[derive(Debug)]
struct Slots<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for Slots<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> Slots<K, V> {
    fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let idx = *self.index.get(key)?;
        Some(&mut self.entries[idx].1)
    }

    fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        let idx = match self.index.get(&key) {
            Some(idx) => *idx,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, make()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

/// One step from a node to its child
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Field(String),
    Bucket(Fingerprint),
}

#[derive(Debug)]
enum MergeNode {
    Leaf(Value),
    Branch(Branch),
}

#[derive(Debug, Default)]
struct Branch {
    fields: Slots<String, MergeNode>,
    buckets: Slots<Fingerprint, Branch>,
}

impl Branch {
    fn insert(
        &mut self,
        steps: &[Step],
        leaf: &str,
        value: Value,
        path: String,
    ) -> Result<(), TreeError> {
        match steps.split_first() {
            None => {
                let path = format!("{path}.{leaf}");
                match self.fields.get_mut(leaf) {
                    Some(MergeNode::Leaf(existing)) => *existing = value,
                    Some(MergeNode::Branch(_)) => return Err(scalar_conflict(path)),
                    None => {
                        self.fields
                            .get_or_insert_with(leaf.to_string(), || MergeNode::Leaf(value));
                    }
                }
                Ok(())
            }
            Some((Step::Field(name), rest)) => {
                let path = format!("{path}.{name}");
                match self
                    .fields
                    .get_or_insert_with(name.clone(), || MergeNode::Branch(Branch::default()))
                {
                    MergeNode::Branch(child) => child.insert(rest, leaf, value, path),
                    MergeNode::Leaf(_) => Err(scalar_conflict(path)),
                }
            }
            Some((Step::Bucket(fingerprint), rest)) => self
                .buckets
                .get_or_insert_with(*fingerprint, Branch::default)
                .insert(rest, leaf, value, format!("{path}{ARRAY_MARKER}")),
        }
    }

    fn resolve(self, path: &str) -> Result<Value, TreeError> {
        let (leaves, branches): (Vec<_>, Vec<_>) = self
            .fields
            .into_entries()
            .into_iter()
            .partition(|(_, node)| matches!(node, MergeNode::Leaf(_)));

        if !self.buckets.is_empty() {
            if let Some((hidden, _)) = leaves.first().or_else(|| branches.first()) {
                return Err(TreeError::ShapeConflict {
                    path: format!("{path}.{hidden}"),
                    kind: ConflictKind::HiddenByArray {
                        array_path: format!("{path}{ARRAY_MARKER}"),
                    },
                });
            }
            let element_path = format!("{path}{ARRAY_MARKER}");
            return self
                .buckets
                .into_entries()
                .into_iter()
                .map(|(_, element)| element.resolve(&element_path))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array);
        }

        let mut object = Map::new();
        for (name, node) in leaves.into_iter().chain(branches) {
            let value = match node {
                MergeNode::Leaf(value) => value,
                MergeNode::Branch(child) => child.resolve(&format!("{path}.{name}"))?,
            };
            object.insert(name, value);
        }
        Ok(Value::Object(object))
    }
}

fn scalar_conflict(path: String) -> TreeError {
    TreeError::ShapeConflict {
        path,
        kind: ConflictKind::ScalarAndObject,
    }
}

/// Per-record fingerprints of every array boundary, computed on demand.
struct RecordFingerprints<'r> {
    /// Boundary prefix (up to and including its last `[]`) -> direct leaves
    groups: HashMap<String, Vec<(&'r str, &'r Value)>>,
    cache: HashMap<String, Fingerprint>,
}

impl<'r> RecordFingerprints<'r> {
    fn new(record: &'r FlatRecord) -> Self {
        let mut groups: HashMap<String, Vec<(&'r str, &'r Value)>> = HashMap::new();
        for (key, value) in record.entries() {
            let (prefix, name) = match key.rfind(ARRAY_MARKER) {
                Some(pos) => key.split_at(pos + ARRAY_MARKER.len()),
                None => ("", key.as_str()),
            };
            groups
                .entry(prefix.to_string())
                .or_default()
                .push((name, value));
        }
        Self {
            groups,
            cache: HashMap::new(),
        }
    }

    fn get(&mut self, prefix: &str) -> Result<Fingerprint, TreeError> {
        if let Some(fingerprint) = self.cache.get(prefix) {
            return Ok(*fingerprint);
        }
        let leaves = self.groups.get(prefix).map(Vec::as_slice).unwrap_or(&[]);
        let fingerprint = Fingerprint::of_leaves(prefix, leaves)?;
        self.cache.insert(prefix.to_string(), fingerprint);
        Ok(fingerprint)
    }
}

/// Steps and leaf name for one record key.
fn key_steps<'k>(
    key: &'k str,
    fingerprints: &mut RecordFingerprints<'_>,
) -> Result<(Vec<Step>, &'k str), TreeError> {
    let parts: Vec<&str> = key.split(ARRAY_MARKER).collect();
    let last = parts.len() - 1;
    let mut steps = Vec::new();
    let mut leaf = "";

    for (idx, part) in parts.iter().enumerate() {
        let mut names: Vec<&str> = part.split('.').filter(|n| !n.is_empty()).collect();
        if idx == last {
            leaf = names.pop().unwrap_or("");
        }
        steps.extend(names.into_iter().map(|n| Step::Field(n.to_string())));
        if idx < last {
            let prefix = format!("{}{ARRAY_MARKER}", parts[..=idx].join(ARRAY_MARKER));
            steps.push(Step::Bucket(fingerprints.get(&prefix)?));
        }
    }

    Ok((steps, leaf))
}

fn merge_record(root: &mut Branch, record: &FlatRecord) -> Result<(), TreeError> {
    let mut fingerprints = RecordFingerprints::new(record);
    for (key, value) in record.entries() {
        let (steps, leaf) = key_steps(key, &mut fingerprints)?;
        root.insert(&steps, leaf, value.clone(), "$".to_string())?;
    }
    Ok(())
}

fn merge_records<'a>(records: impl IntoIterator<Item = &'a FlatRecord>) -> Result<Value, TreeError> {
    let mut root = Branch::default();
    for record in records {
        merge_record(&mut root, record)?;
    }
    root.resolve("$")
}

/// Rebuild the result tree from `records` collected against `paths`.
pub fn reconstruct(paths: &[String], records: &[FlatRecord]) -> Result<Value, TreeError> {
    if records.is_empty() {
        let root_is_array = paths.iter().any(|p| p.starts_with("$[]"));
        return Ok(if root_is_array {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        });
    }

    let has_arrays = paths.iter().any(|p| p.contains(ARRAY_MARKER));

    if !has_arrays && paths.iter().all(|p| p.starts_with("$.")) {
        if records.len() > 1 {
            log::warn!(
                "Object-shaped result: keeping the first of {} rows",
                records.len()
            );
        }
        return merge_records(&records[..1]);
    }

    if !has_arrays {
        return records
            .iter()
            .map(|record| merge_records(std::iter::once(record)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array);
    }

    merge_records(records)
}
