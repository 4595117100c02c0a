//! Persisted sample store
//!
//! Append-only collection of recorded price samples. Backends:
//! - `MemoryStore`: process-local, for tests and throwaway runs
//! - `JsonlStore`: JSON-lines file that survives restarts
//! - `HttpStore`: client for a remote store served by `StoreServer`

mod http;
mod jsonl;
mod memory;
mod server;
mod types;

pub use http::{HttpStore, DEFAULT_STORE_URL};
pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use server::{StoreServer, StoreServerConfig, STORE_PATH};
pub use types::StoreError;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Wall-clock format used for sample timestamps (e.g., "3:45:12 PM")
pub const SAMPLE_TIME_FORMAT: &str = "%-I:%M:%S %p";

/// One recorded (buy, sell) price pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Local time the sample was taken
    #[serde(default)]
    pub time: String,
    /// Best buy-side price
    #[serde(with = "rust_decimal::serde::float")]
    pub buy: Decimal,
    /// Best sell-side price
    #[serde(with = "rust_decimal::serde::float")]
    pub sell: Decimal,
    /// Advertiser of the best buy-side listing
    #[serde(default)]
    pub advertiser: String,
}

impl Sample {
    pub fn new(
        time: impl Into<String>,
        buy: Decimal,
        sell: Decimal,
        advertiser: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            buy,
            sell,
            advertiser: advertiser.into(),
        }
    }

    /// Build a sample stamped with the given wall-clock time
    pub fn taken_at<Tz: TimeZone>(
        at: &DateTime<Tz>,
        buy: Decimal,
        sell: Decimal,
        advertiser: impl Into<String>,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self::new(at.format(SAMPLE_TIME_FORMAT).to_string(), buy, sell, advertiser)
    }

    /// Build a sample stamped with the current local time
    pub fn now(buy: Decimal, sell: Decimal, advertiser: impl Into<String>) -> Self {
        Self::taken_at(&Local::now(), buy, sell, advertiser)
    }
}

/// Trait for sample store backends
///
/// All operations are fallible and never retried by callers.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append a sample, returning the stored record
    async fn insert(&self, sample: Sample) -> Result<Sample, StoreError>;
    /// All stored samples in insertion order
    async fn list_all(&self) -> Result<Vec<Sample>, StoreError>;
    /// Remove every sample, returning how many were removed
    async fn delete_all(&self) -> Result<u64, StoreError>;
}
