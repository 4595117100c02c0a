//! Keeps the view cache in step with the sample store

use super::{ShadowSlot, ViewCache};
use crate::store::{RecordStore, Sample, StoreError};
use crate::telemetry::names;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Owns the view cache and its shadow slot.
///
/// The store is always the source of truth: a completed `list()` replaces
/// whatever the cache held, including restored shadow contents.
pub struct Reconciler {
    store: Arc<dyn RecordStore>,
    cache: RwLock<ViewCache>,
    shadow: ShadowSlot,
}

impl Reconciler {
    pub fn new(store: Arc<dyn RecordStore>, shadow: ShadowSlot) -> Self {
        Self {
            store,
            cache: RwLock::new(ViewCache::default()),
            shadow,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Seed the cache from the shadow slot. Returns true if anything was loaded.
    pub async fn restore(&self) -> bool {
        let Some(entry) = self.shadow.load().await else {
            return false;
        };

        let count = entry.samples.len();
        self.cache.write().await.restore(entry.samples);
        tracing::info!(
            count,
            last_provenance = ?entry.provenance,
            "Restored view cache from shadow slot"
        );
        true
    }

    /// Fetch the full collection and replace the cache with it
    pub async fn list(&self) -> Result<Vec<Sample>, StoreError> {
        let samples = self.store.list_all().await.inspect_err(|_| {
            metrics::counter!(names::STORE_ERRORS_TOTAL, "op" => "list").increment(1);
        })?;

        let entry = {
            let mut cache = self.cache.write().await;
            cache.confirm(samples.clone());
            cache.to_entry()
        };
        metrics::gauge!(names::VIEW_CACHE_SAMPLES).set(samples.len() as f64);
        self.shadow.save(&entry).await;

        Ok(samples)
    }

    /// Empty the cache and its shadow; the store is left alone
    pub async fn clear_local(&self) {
        let entry = {
            let mut cache = self.cache.write().await;
            cache.clear_local();
            cache.to_entry()
        };
        metrics::gauge!(names::VIEW_CACHE_SAMPLES).set(0.0);
        self.shadow.save(&entry).await;
    }

    /// Delete everything in the store, then clear locally.
    ///
    /// On failure the cache is left as it was.
    pub async fn purge_all(&self) -> Result<u64, StoreError> {
        let deleted = self.store.delete_all().await.inspect_err(|_| {
            metrics::counter!(names::STORE_ERRORS_TOTAL, "op" => "delete_all").increment(1);
        })?;
        self.clear_local().await;
        tracing::info!(deleted, "Purged sample store");
        Ok(deleted)
    }

    /// Copy of the current cache
    pub async fn snapshot(&self) -> ViewCache {
        self.cache.read().await.clone()
    }

    /// Samples currently in the cache
    pub async fn samples(&self) -> Vec<Sample> {
        self.cache.read().await.samples().to_vec()
    }
}
