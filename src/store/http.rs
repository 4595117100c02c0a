//! HTTP client for a remote sample store

use super::{RecordStore, Sample, StoreError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

/// Default remote store endpoint
pub const DEFAULT_STORE_URL: &str = "http://localhost:5000/backend/models/data";

/// Remote store reached over HTTP
pub struct HttpStore {
    url: String,
    client: Client,
}

impl HttpStore {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status { status, body })
    }
}

#[derive(Debug, Deserialize)]
struct InsertResponse {
    data: Sample,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    message: String,
}

#[async_trait]
impl RecordStore for HttpStore {
    async fn insert(&self, sample: Sample) -> Result<Sample, StoreError> {
        let response = self.client.post(&self.url).json(&sample).send().await?;
        let body: InsertResponse = Self::check(response).await?.json().await?;
        Ok(body.data)
    }

    async fn list_all(&self) -> Result<Vec<Sample>, StoreError> {
        let response = self.client.get(&self.url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let response = self.client.delete(&self.url).send().await?;
        let body: DeleteResponse = Self::check(response).await?.json().await?;
        tracing::debug!(message = %body.message, "Store delete acknowledged");
        Ok(parse_deleted_count(&body.message))
    }
}

/// Extract N from "Deleted N document(s)."
fn parse_deleted_count(message: &str) -> u64 {
    message
        .split_whitespace()
        .find_map(|word| word.parse().ok())
        .unwrap_or(0)
}
