//! Shared fixtures: a canned executor and the blog schema

use async_trait::async_trait;
use pathsql::executor::{Cell, QueryExecutionError, QueryExecutor, QueryParams, QueryResult};
use pathsql::schema_metadata::StaticMetadata;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Answers every query whose text contains a registered fragment.
#[derive(Default)]
pub struct CannedExecutor {
    answers: Vec<(String, QueryResult)>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl CannedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, fragment: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let result = QueryResult {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Cell::Value).collect())
                .collect(),
        };
        self.answers.push((fragment.to_string(), result));
        self
    }

    /// Number of queries whose text contains `fragment`
    pub fn calls_matching(&self, fragment: &str) -> usize {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|sql| sql.contains(fragment))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryExecutor for CannedExecutor {
    async fn execute(
        &self,
        sql: &str,
        _params: &QueryParams,
    ) -> Result<QueryResult, QueryExecutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(sql.to_string());
        self.answers
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, result)| result.clone())
            .ok_or_else(|| QueryExecutionError::Backend(format!("no canned answer for: {sql}")))
    }
}

/// posts, comments, tags and categories with their foreign keys
pub fn blog_schema() -> StaticMetadata {
    StaticMetadata::new()
        .with_table("posts", &["id", "title", "category_id"])
        .with_table("comments", &["id", "post_id", "body"])
        .with_table("tags", &["id", "post_id", "label"])
        .with_table("categories", &["id", "name"])
        .with_foreign_key(("comments", "post_id"), ("posts", "id"))
        .with_foreign_key(("tags", "post_id"), ("posts", "id"))
        .with_foreign_key(("posts", "category_id"), ("categories", "id"))
}
