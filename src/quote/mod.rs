//! Quote fetching module
//!
//! Pulls buy-side and sell-side advertisement listings from the Binance P2P feed

mod fetcher;
mod p2p;
mod types;

pub use fetcher::{LiveQuotes, QuoteFetcher, RefreshOutcome};
pub use p2p::{P2pClient, P2pConfig, P2P_SEARCH_URL};
pub use types::{FetchError, FilterError, PublisherType, QuoteFilter, DEFAULT_PAY_TYPES};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction of an advertisement listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    /// Upstream wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "BUY",
            TradeType::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single advertised price for one trade direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Advertised price in fiat
    pub price: Decimal,
    /// Traded asset (e.g., "USDT")
    pub asset: String,
    /// Advertiser nickname
    pub advertiser: String,
}

/// Trait for upstream quote feeds
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch listings for one direction, preserving upstream order
    async fn fetch(
        &self,
        trade_type: TradeType,
        filter: &QuoteFilter,
    ) -> Result<Vec<Quote>, FetchError>;
}
