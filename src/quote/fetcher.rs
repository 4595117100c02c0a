//! Two-sided quote refresh
//!
//! A refresh queries both trade directions against one snapshot of the filter.
//! A failed direction keeps its previous listings so callers always have the
//! last good data to work with.

use super::{FetchError, Quote, QuoteFilter, QuoteSource, TradeType};
use crate::telemetry::names;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Result of one refresh, per direction
#[derive(Debug)]
pub struct RefreshOutcome {
    pub buy: Result<Vec<Quote>, FetchError>,
    pub sell: Result<Vec<Quote>, FetchError>,
}

impl RefreshOutcome {
    /// True when both directions succeeded
    pub fn is_complete(&self) -> bool {
        self.buy.is_ok() && self.sell.is_ok()
    }
}

/// Fetches both directions from a quote source
pub struct QuoteFetcher {
    source: Arc<dyn QuoteSource>,
}

impl QuoteFetcher {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self { source }
    }

    /// Query both directions concurrently using the given filter snapshot
    pub async fn refresh(&self, filter: &QuoteFilter) -> RefreshOutcome {
        let (buy, sell) = tokio::join!(
            self.source.fetch(TradeType::Buy, filter),
            self.source.fetch(TradeType::Sell, filter),
        );

        for (side, result) in [(TradeType::Buy, &buy), (TradeType::Sell, &sell)] {
            let outcome = match result {
                Ok(quotes) => {
                    tracing::debug!(side = %side, count = quotes.len(), "Fetched P2P listings");
                    "ok"
                }
                Err(e) => {
                    tracing::warn!(side = %side, error = %e, "Quote refresh failed, keeping stale listings");
                    "error"
                }
            };
            metrics::counter!(
                names::REFRESH_TOTAL,
                "side" => side.as_str(),
                "outcome" => outcome
            )
            .increment(1);
        }

        RefreshOutcome { buy, sell }
    }
}

/// Latest listings for both directions
#[derive(Debug, Clone, Default)]
pub struct LiveQuotes {
    /// Buy-side listings, best first
    pub buy: Vec<Quote>,
    /// Sell-side listings, best first
    pub sell: Vec<Quote>,
    /// Last successful buy-side refresh
    pub buy_updated_at: Option<DateTime<Utc>>,
    /// Last successful sell-side refresh
    pub sell_updated_at: Option<DateTime<Utc>>,
}

impl LiveQuotes {
    /// Replace each direction that refreshed successfully.
    ///
    /// Failed directions are left untouched.
    pub fn apply(&mut self, outcome: RefreshOutcome) {
        let now = Utc::now();
        if let Ok(buy) = outcome.buy {
            self.buy = buy;
            self.buy_updated_at = Some(now);
        }
        if let Ok(sell) = outcome.sell {
            self.sell = sell;
            self.sell_updated_at = Some(now);
        }
    }

    /// Best (first) quote on each side, if both sides have one
    pub fn best_pair(&self) -> Option<(&Quote, &Quote)> {
        Some((self.buy.first()?, self.sell.first()?))
    }
}
