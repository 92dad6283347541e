//! Reader-owned metadata cache
//!
//! Reads share a read lock. A miss is fetched by the caller without holding
//! any lock and stored under the write lock; when two callers race on the same
//! miss the first stored value wins.
//!
//! Every store carries the generation observed before its fetch. `clear` bumps
//! the generation, so a fetch that started before an invalidation is returned
//! to its caller but never cached.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use super::{ForeignKey, TableMetadata};

#[derive(Debug, Default)]
pub struct MetadataCache {
    tables: RwLock<HashMap<String, TableMetadata>>,
    foreign_keys: RwLock<Option<Vec<ForeignKey>>>,
    generation: AtomicU64,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take this before fetching a miss and pass it to the matching store.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn table(&self, name: &str) -> Option<TableMetadata> {
        self.tables.read().await.get(name).cloned()
    }

    /// Store `metadata` unless another caller got there first; returns the cached value.
    pub async fn store_table(&self, metadata: TableMetadata, generation: u64) -> TableMetadata {
        let mut tables = self.tables.write().await;
        if generation != self.generation() {
            log::debug!("Not caching stale metadata for table {}", metadata.name);
            return metadata;
        }
        tables
            .entry(metadata.name.clone())
            .or_insert(metadata)
            .clone()
    }

    pub async fn foreign_keys(&self) -> Option<Vec<ForeignKey>> {
        self.foreign_keys.read().await.clone()
    }

    pub async fn store_foreign_keys(
        &self,
        foreign_keys: Vec<ForeignKey>,
        generation: u64,
    ) -> Vec<ForeignKey> {
        let mut cached = self.foreign_keys.write().await;
        if generation != self.generation() {
            log::debug!("Not caching stale foreign key list");
            return foreign_keys;
        }
        cached.get_or_insert(foreign_keys).clone()
    }

    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        let mut foreign_keys = self.foreign_keys.write().await;
        let dropped = tables.len();
        self.generation.fetch_add(1, Ordering::SeqCst);
        tables.clear();
        *foreign_keys = None;
        log::info!("Metadata cache invalidated ({} tables dropped)", dropped);
    }
}
