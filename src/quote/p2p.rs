//! Binance P2P advertisement search client
//!
//! Queries the public P2P search endpoint for one trade direction at a time.
//! Each listing carries the advertised price, the asset and the advertiser's
//! nickname; listings are returned in the order the feed ranks them.

use super::{FetchError, Quote, QuoteFilter, QuoteSource, TradeType};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// P2P advertisement search endpoint
pub const P2P_SEARCH_URL: &str = "https://p2p.binance.com/bapi/c2c/v2/friendly/c2c/adv/search";

/// Fixed parts of the upstream query
#[derive(Debug, Clone)]
pub struct P2pConfig {
    /// Search endpoint URL
    pub search_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Fiat currency (e.g., "KES")
    pub fiat: String,
    /// Crypto asset (e.g., "USDT")
    pub asset: String,
    /// Country codes to search
    pub countries: Vec<String>,
    /// Advertiser classification tags
    pub classifies: Vec<String>,
    /// Result page
    pub page: u32,
    /// Rows per page
    pub rows: u32,
}

impl Default for P2pConfig {
    fn default() -> Self {
        Self {
            search_url: P2P_SEARCH_URL.to_string(),
            timeout: Duration::from_secs(10),
            fiat: "KES".to_string(),
            asset: "USDT".to_string(),
            countries: vec!["KE".to_string()],
            classifies: vec![
                "mass".to_string(),
                "profession".to_string(),
                "fiat_trade".to_string(),
            ],
            page: 1,
            rows: 10,
        }
    }
}

/// HTTP client for the P2P search endpoint
pub struct P2pClient {
    config: P2pConfig,
    client: Client,
}

impl P2pClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(P2pConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: P2pConfig) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Build the request payload for one direction
    fn build_request<'a>(
        &'a self,
        trade_type: TradeType,
        filter: &'a QuoteFilter,
    ) -> SearchRequest<'a> {
        SearchRequest {
            fiat: &self.config.fiat,
            page: self.config.page,
            rows: self.config.rows,
            trade_type: trade_type.as_str(),
            asset: &self.config.asset,
            countries: &self.config.countries,
            additional_kyc_verify_filter: 0,
            classifies: &self.config.classifies,
            filter_type: "all",
            pay_types: &filter.pay_types,
            periods: &[],
            pro_merchant_ads: false,
            publisher_type: filter.publisher_type.as_query(),
            shield_merchant_ads: false,
            trans_amount: filter.trans_amount,
        }
    }
}

#[async_trait]
impl QuoteSource for P2pClient {
    async fn fetch(
        &self,
        trade_type: TradeType,
        filter: &QuoteFilter,
    ) -> Result<Vec<Quote>, FetchError> {
        let payload = self.build_request(trade_type, filter);

        tracing::debug!(
            url = %self.config.search_url,
            side = %trade_type,
            amount = %filter.trans_amount,
            "Fetching P2P listings"
        );

        let response = self
            .client
            .post(&self.config.search_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }
}

/// Search payload, field names as the endpoint expects them
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    fiat: &'a str,
    page: u32,
    rows: u32,
    trade_type: &'a str,
    asset: &'a str,
    countries: &'a [String],
    additional_kyc_verify_filter: u8,
    classifies: &'a [String],
    filter_type: &'a str,
    pay_types: &'a [String],
    periods: &'a [String],
    pro_merchant_ads: bool,
    publisher_type: Option<&'a str>,
    shield_merchant_ads: bool,
    #[serde(with = "rust_decimal::serde::float")]
    trans_amount: Decimal,
}

/// Search response envelope
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    adv: Advertisement,
    advertiser: Advertiser,
}

#[derive(Debug, Deserialize)]
struct Advertisement {
    /// Price as a decimal string
    price: String,
    asset: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Advertiser {
    nick_name: String,
}

/// Parse a search response body into quotes, keeping upstream order
fn parse_search_response(body: &str) -> Result<Vec<Quote>, FetchError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    response
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|item| {
            let price = Decimal::from_str(&item.adv.price)
                .map_err(|_| FetchError::InvalidPrice(item.adv.price.clone()))?;
            Ok(Quote {
                price,
                asset: item.adv.asset,
                advertiser: item.advertiser.nick_name,
            })
        })
        .collect()
}
