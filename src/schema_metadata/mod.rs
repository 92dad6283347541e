//! Schema metadata: columns, primary keys and foreign keys
//!
//! [`SchemaMetadataProvider`] is what path inference consults. The bundled
//! [`MetadataReader`] answers it by running introspection queries through a
//! [`QueryExecutor`] and caching the answers until invalidated.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

mod cache;
pub mod errors;
mod introspection;

pub use cache::MetadataCache;
pub use errors::MetadataError;
pub use introspection::Backend;

use crate::executor::{QueryExecutor, QueryParams};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub name: String,
    pub columns: Vec<String>,
    pub primary_keys: Vec<String>,
    /// Foreign keys originating from this table
    pub foreign_keys: Vec<ForeignKey>,
}

#[async_trait]
pub trait SchemaMetadataProvider: Send + Sync {
    async fn table_metadata(&self, table: &str) -> Result<TableMetadata, MetadataError>;

    async fn columns(&self, table: &str) -> Result<Vec<String>, MetadataError> {
        Ok(self.table_metadata(table).await?.columns)
    }

    async fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>, MetadataError> {
        Ok(self
            .all_foreign_keys()
            .await?
            .into_iter()
            .filter(|fk| fk.from_table == table)
            .collect())
    }

    async fn all_foreign_keys(&self) -> Result<Vec<ForeignKey>, MetadataError>;

    async fn invalidate_cache(&self);
}

/// Introspects through an executor; one instance per logical connection.
pub struct MetadataReader<E: QueryExecutor + ?Sized> {
    executor: Arc<E>,
    driver: String,
    cache: MetadataCache,
}

impl<E: QueryExecutor + ?Sized> MetadataReader<E> {
    /// The driver is checked on first use, so an unsupported one only fails the
    /// lookups, never construction.
    pub fn new(executor: Arc<E>, driver: impl Into<String>) -> Self {
        Self {
            executor,
            driver: driver.into(),
            cache: MetadataCache::new(),
        }
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    fn backend(&self) -> Result<Backend, MetadataError> {
        Backend::from_driver(&self.driver)
    }

    async fn table_names(
        &self,
        what: &str,
        sql: &str,
        table: &str,
    ) -> Result<Vec<String>, MetadataError> {
        let mut params = QueryParams::new();
        params.insert("table".to_string(), serde_json::Value::from(table));
        let result = self
            .executor
            .execute(sql, &params)
            .await
            .map_err(|source| MetadataError::Query {
                what: format!("{what} of {table}"),
                source,
            })?;
        introspection::decode_names(what, result)
    }
}

#[async_trait]
impl<E: QueryExecutor + ?Sized> SchemaMetadataProvider for MetadataReader<E> {
    async fn table_metadata(&self, table: &str) -> Result<TableMetadata, MetadataError> {
        let generation = self.cache.generation();
        if let Some(cached) = self.cache.table(table).await {
            return Ok(cached);
        }

        let backend = self.backend()?;
        log::debug!("Fetching {:?} metadata for table {}", backend, table);

        let columns = self
            .table_names("columns", backend.columns_sql(), table)
            .await?;
        let primary_keys = self
            .table_names("primary keys", backend.primary_keys_sql(), table)
            .await?;
        let foreign_keys = self.foreign_keys(table).await?;

        let metadata = TableMetadata {
            name: table.to_string(),
            columns,
            primary_keys,
            foreign_keys,
        };
        Ok(self.cache.store_table(metadata, generation).await)
    }

    async fn all_foreign_keys(&self) -> Result<Vec<ForeignKey>, MetadataError> {
        let generation = self.cache.generation();
        if let Some(cached) = self.cache.foreign_keys().await {
            return Ok(cached);
        }

        let backend = self.backend()?;
        let foreign_keys = match backend.foreign_keys_sql() {
            Some(sql) => {
                let result = self
                    .executor
                    .execute(sql, &QueryParams::new())
                    .await
                    .map_err(|source| MetadataError::Query {
                        what: "foreign keys".to_string(),
                        source,
                    })?;
                introspection::decode_foreign_keys(result)?
            }
            None => Vec::new(),
        };
        log::debug!("Loaded {} foreign keys", foreign_keys.len());

        Ok(self.cache.store_foreign_keys(foreign_keys, generation).await)
    }

    async fn invalidate_cache(&self) {
        self.cache.clear().await;
    }
}

/// Fixed metadata, for tests and for callers that already know their schema.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    tables: HashMap<String, TableMetadata>,
    foreign_keys: Vec<ForeignKey>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, columns: &[&str]) -> Self {
        self.tables.insert(
            name.to_string(),
            TableMetadata {
                name: name.to_string(),
                columns: columns.iter().map(|c| c.to_string()).collect(),
                primary_keys: Vec::new(),
                foreign_keys: Vec::new(),
            },
        );
        self
    }

    pub fn with_foreign_key(mut self, from: (&str, &str), to: (&str, &str)) -> Self {
        let fk = ForeignKey {
            from_table: from.0.to_string(),
            from_column: from.1.to_string(),
            to_table: to.0.to_string(),
            to_column: to.1.to_string(),
        };
        if let Some(table) = self.tables.get_mut(from.0) {
            table.foreign_keys.push(fk.clone());
        }
        self.foreign_keys.push(fk);
        self
    }
}

#[async_trait]
impl SchemaMetadataProvider for StaticMetadata {
    async fn table_metadata(&self, table: &str) -> Result<TableMetadata, MetadataError> {
        Ok(self.tables.get(table).cloned().unwrap_or_else(|| TableMetadata {
            name: table.to_string(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            foreign_keys: Vec::new(),
        }))
    }

    async fn all_foreign_keys(&self) -> Result<Vec<ForeignKey>, MetadataError> {
        Ok(self.foreign_keys.clone())
    }

    async fn invalidate_cache(&self) {}
}
