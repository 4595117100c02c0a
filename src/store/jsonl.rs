//! Append-only JSON-lines sample store

use super::{RecordStore, Sample, StoreError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// File-backed store, one JSON sample per line
pub struct JsonlStore {
    path: PathBuf,
    /// Serializes file access between concurrent callers
    lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_content(&self) -> Result<String, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_lines(&self) -> Result<Vec<Sample>, StoreError> {
        self.read_content()
            .await?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl RecordStore for JsonlStore {
    async fn insert(&self, sample: Sample) -> Result<Sample, StoreError> {
        let mut line = serde_json::to_string(&sample)?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(path = ?self.path, "Appended sample");
        Ok(sample)
    }

    async fn list_all(&self) -> Result<Vec<Sample>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_lines().await
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let _guard = self.lock.lock().await;
        // Lines are counted, not decoded, so a torn append can still be purged
        let count = self
            .read_content()
            .await?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count() as u64;
        if count > 0 {
            fs::write(&self.path, b"").await?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlStore::new(temp_dir.path().join("samples.jsonl"));

        assert!(store.list_all().await.unwrap().is_empty());
        assert_eq!(store.delete_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_round_trip_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("samples.jsonl");
        let sample = Sample::new("10:30:00 AM", dec!(129.35), dec!(127.8), "alpha");

        {
            let store = JsonlStore::new(&path);
            store.insert(sample.clone()).await.unwrap();
        }

        let reopened = JsonlStore::new(&path);
        assert_eq!(reopened.list_all().await.unwrap(), vec![sample]);
    }

    #[tokio::test]
    async fn test_delete_all_truncates() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlStore::new(temp_dir.path().join("samples.jsonl"));

        for i in 0..3 {
            store
                .insert(Sample::new(format!("{}:00:00 PM", i + 1), dec!(1), dec!(2), "a"))
                .await
                .unwrap();
        }

        assert_eq!(store.delete_all().await.unwrap(), 3);
        assert!(store.list_all().await.unwrap().is_empty());
        assert_eq!(store.delete_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_line_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("samples.jsonl");
        std::fs::write(&path, "{not json}\n").unwrap();

        let store = JsonlStore::new(&path);
        assert!(matches!(store.list_all().await, Err(StoreError::Serde(_))));
    }

    #[tokio::test]
    async fn test_delete_all_clears_torn_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("samples.jsonl");
        let store = JsonlStore::new(&path);
        store
            .insert(Sample::new("1:00:00 PM", dec!(130), dec!(128), "alpha"))
            .await
            .unwrap();

        // Crash mid-append
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str(r#"{"time":"t","bu"#);
        std::fs::write(&path, content).unwrap();
        assert!(store.list_all().await.is_err());

        assert_eq!(store.delete_all().await.unwrap(), 2);
        assert!(store.list_all().await.unwrap().is_empty());
        assert_eq!(store.delete_all().await.unwrap(), 0);
    }
}
