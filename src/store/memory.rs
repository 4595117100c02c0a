//! In-memory sample store

use super::{RecordStore, Sample, StoreError};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Process-local store; contents are lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    samples: RwLock<Vec<Sample>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored samples
    pub async fn len(&self) -> usize {
        self.samples.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.samples.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, sample: Sample) -> Result<Sample, StoreError> {
        self.samples.write().await.push(sample.clone());
        Ok(sample)
    }

    async fn list_all(&self) -> Result<Vec<Sample>, StoreError> {
        Ok(self.samples.read().await.clone())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut samples = self.samples.write().await;
        let count = samples.len() as u64;
        samples.clear();
        Ok(count)
    }
}
