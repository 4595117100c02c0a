//! Configuration types for p2p-recorder

use crate::controller::ControllerConfig;
use crate::quote::{P2pConfig, PublisherType, QuoteFilter, DEFAULT_PAY_TYPES, P2P_SEARCH_URL};
use crate::store::{StoreServerConfig, DEFAULT_STORE_URL, STORE_PATH};
use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Built-in configuration, used when no config file is found
pub const DEFAULT_CONFIG: &str = include_str!("../config.toml.example");

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Upstream P2P feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Search endpoint URL
    #[serde(default = "default_search_url")]
    pub search_url: String,
    /// Request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_fiat")]
    pub fiat: String,
    #[serde(default = "default_asset")]
    pub asset: String,
    #[serde(default = "default_countries")]
    pub countries: Vec<String>,
    #[serde(default = "default_classifies")]
    pub classifies: Vec<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    /// Listings requested per direction
    #[serde(default = "default_rows")]
    pub rows: u32,
}

fn default_search_url() -> String {
    P2P_SEARCH_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_fiat() -> String {
    "KES".to_string()
}
fn default_asset() -> String {
    "USDT".to_string()
}
fn default_countries() -> Vec<String> {
    vec!["KE".to_string()]
}
fn default_classifies() -> Vec<String> {
    ["mass", "profession", "fiat_trade"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_page() -> u32 {
    1
}
fn default_rows() -> u32 {
    10
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            timeout_secs: default_timeout_secs(),
            fiat: default_fiat(),
            asset: default_asset(),
            countries: default_countries(),
            classifies: default_classifies(),
            page: default_page(),
            rows: default_rows(),
        }
    }
}

/// Initial operator filter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Transaction amount in fiat
    #[serde(default = "default_trans_amount")]
    pub trans_amount: Decimal,
    #[serde(default)]
    pub publisher_type: PublisherType,
    #[serde(default = "default_pay_types")]
    pub pay_types: Vec<String>,
}

fn default_trans_amount() -> Decimal {
    Decimal::new(1000, 0)
}
fn default_pay_types() -> Vec<String> {
    DEFAULT_PAY_TYPES.iter().map(|s| s.to_string()).collect()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            trans_amount: default_trans_amount(),
            publisher_type: PublisherType::None,
            pay_types: default_pay_types(),
        }
    }
}

/// Refresh and recording cadence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Quote refresh period (seconds)
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Sample recording period (seconds)
    #[serde(default = "default_record_interval_secs")]
    pub record_interval_secs: u64,
}

fn default_refresh_interval_secs() -> u64 {
    20
}
fn default_record_interval_secs() -> u64 {
    30 * 60
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            record_interval_secs: default_record_interval_secs(),
        }
    }
}

/// Sample store backend
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Remote store over HTTP
    #[default]
    Http,
    /// Local JSON-lines file
    Jsonl,
    /// In-process, lost on exit
    Memory,
}

/// Sample store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Remote store URL (http backend)
    #[serde(default = "default_store_url")]
    pub url: String,
    /// Samples file (jsonl backend)
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Request timeout (seconds, http backend)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Address the `serve` command binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

fn default_store_url() -> String {
    DEFAULT_STORE_URL.to_string()
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./data/samples.jsonl")
}
fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Http,
            url: default_store_url(),
            path: default_store_path(),
            timeout_secs: default_timeout_secs(),
            listen_addr: default_listen_addr(),
        }
    }
}

/// View cache configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Shadow slot file; no shadow when unset
    #[serde(default)]
    pub shadow_path: Option<PathBuf>,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.schedule.refresh_interval_secs == 0 || self.schedule.record_interval_secs == 0 {
            anyhow::bail!("Schedule intervals must be at least one second");
        }
        if self.filter.trans_amount <= Decimal::ZERO {
            anyhow::bail!(
                "Transaction amount must be positive, got {}",
                self.filter.trans_amount
            );
        }
        Ok(())
    }

    /// Upstream client settings
    pub fn p2p_config(&self) -> P2pConfig {
        P2pConfig {
            search_url: self.feed.search_url.clone(),
            timeout: Duration::from_secs(self.feed.timeout_secs),
            fiat: self.feed.fiat.clone(),
            asset: self.feed.asset.clone(),
            countries: self.feed.countries.clone(),
            classifies: self.feed.classifies.clone(),
            page: self.feed.page,
            rows: self.feed.rows,
        }
    }

    /// Controller settings, including the initial filter
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            refresh_interval: Duration::from_secs(self.schedule.refresh_interval_secs),
            record_interval: Duration::from_secs(self.schedule.record_interval_secs),
            filter: QuoteFilter {
                trans_amount: self.filter.trans_amount,
                publisher_type: self.filter.publisher_type,
                pay_types: self.filter.pay_types.clone(),
            },
        }
    }

    /// Store server settings for the `serve` command
    pub fn store_server_config(&self) -> StoreServerConfig {
        StoreServerConfig {
            listen_addr: self.store.listen_addr,
            path: STORE_PATH.to_string(),
        }
    }
}
