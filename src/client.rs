//! `PathSqlClient`: SQL in, nested JSON out
//!
//! ```text
//! analyze_query -> execute -> infer_paths -> collect_records -> reconstruct
//! ```
//!
//! Only the executor and metadata calls are awaited; every other stage is a
//! plain function of its inputs.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::config::PathSqlConfig;
use crate::executor::{
    ClickHouseExecutor, QueryExecutionError, QueryExecutor, QueryParams, QueryResult,
};
use crate::path_inference::{
    explicit_paths, fallback_paths, has_explicit_paths, infer_paths, needs_column_metadata,
    SchemaSnapshot,
};
use crate::query_analyzer::{analyze_query, QueryShape};
use crate::result_tree::{collect_records, reconstruct, TreeError};
use crate::schema_metadata::{MetadataError, MetadataReader, SchemaMetadataProvider};

#[derive(Debug, Error)]
pub enum PathQueryError {
    #[error("Query execution failed: {0}")]
    QueryExecution(#[from] QueryExecutionError),

    #[error("Result reconstruction failed: {0}")]
    Reconstruction(#[from] TreeError),
}

#[derive(Clone)]
pub struct PathSqlClient {
    executor: Arc<dyn QueryExecutor>,
    metadata: Arc<dyn SchemaMetadataProvider>,
}

impl PathSqlClient {
    pub fn new(executor: Arc<dyn QueryExecutor>, metadata: Arc<dyn SchemaMetadataProvider>) -> Self {
        Self { executor, metadata }
    }

    /// ClickHouse executor plus a metadata reader over the same connection.
    pub fn from_config(config: &PathSqlConfig) -> Self {
        let executor = Arc::new(ClickHouseExecutor::from_config(config));
        let metadata = Arc::new(MetadataReader::new(
            executor.clone(),
            config.metadata_driver.clone(),
        ));
        Self::new(executor, metadata)
    }

    /// Run `sql` and reshape its rows into a tree.
    pub async fn path_query(&self, sql: &str, params: &QueryParams) -> Result<Value, PathQueryError> {
        let shape = analyze_query(sql);
        let result = self.executor.execute(sql, params).await?;

        let paths = self.output_paths(&shape, &result.columns).await;
        let records = collect_records(&paths, result.rows)?;
        Ok(reconstruct(&paths, &records)?)
    }

    /// Run `sql` without reshaping.
    pub async fn query(&self, sql: &str, params: &QueryParams) -> Result<QueryResult, QueryExecutionError> {
        self.executor.execute(sql, params).await
    }

    pub fn metadata(&self) -> &dyn SchemaMetadataProvider {
        self.metadata.as_ref()
    }

    pub async fn invalidate_metadata_cache(&self) {
        self.metadata.invalidate_cache().await;
    }

    async fn output_paths(&self, shape: &QueryShape, columns: &[String]) -> Vec<String> {
        if has_explicit_paths(columns) {
            let paths = explicit_paths(columns);
            log::debug!("Explicit column paths: {:?}", paths);
            return paths;
        }

        match self.schema_snapshot(shape, columns).await {
            Ok(schema) => infer_paths(shape, columns, &schema),
            Err(e) => {
                log::warn!("Schema metadata unavailable, using flat paths: {}", e);
                fallback_paths(columns)
            }
        }
    }

    async fn schema_snapshot(
        &self,
        shape: &QueryShape,
        columns: &[String],
    ) -> Result<SchemaSnapshot, MetadataError> {
        let foreign_keys = self.metadata.all_foreign_keys().await?;

        let mut table_columns = HashMap::new();
        if needs_column_metadata(shape, columns) {
            for table in shape.tables() {
                if table_columns.contains_key(&table.table) {
                    continue;
                }
                match self.metadata.columns(&table.table).await {
                    Ok(names) => {
                        table_columns.insert(table.table.clone(), names);
                    }
                    Err(e) => log::warn!("No column list for {}: {}", table.table, e),
                }
            }
        }

        Ok(SchemaSnapshot {
            foreign_keys,
            columns: table_columns,
        })
    }
}
