//! Quote filter and fetch error types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default payment methods selected on startup
pub const DEFAULT_PAY_TYPES: [&str; 3] = ["BANK", "MpesaKenya", "MpesaPaybill"];

/// Advertiser category filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublisherType {
    /// Any advertiser
    #[default]
    None,
    /// Merchant advertisers only
    Merchant,
}

impl PublisherType {
    /// Value sent upstream (`null` for no filter)
    pub fn as_query(&self) -> Option<&'static str> {
        match self {
            PublisherType::None => None,
            PublisherType::Merchant => Some("merchant"),
        }
    }
}

impl fmt::Display for PublisherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublisherType::None => write!(f, "none"),
            PublisherType::Merchant => write!(f, "merchant"),
        }
    }
}

impl FromStr for PublisherType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(PublisherType::None),
            "merchant" => Ok(PublisherType::Merchant),
            other => Err(FilterError::UnknownPublisherType(other.to_string())),
        }
    }
}

/// Operator-controlled query filter, read by every refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteFilter {
    /// Transaction amount in fiat
    pub trans_amount: Decimal,
    /// Advertiser category
    #[serde(default)]
    pub publisher_type: PublisherType,
    /// Accepted payment method tags, in selection order
    pub pay_types: Vec<String>,
}

impl Default for QuoteFilter {
    fn default() -> Self {
        Self {
            trans_amount: Decimal::new(1000, 0),
            publisher_type: PublisherType::None,
            pay_types: DEFAULT_PAY_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl QuoteFilter {
    /// Set the transaction amount, rejecting non-positive values
    pub fn set_trans_amount(&mut self, amount: Decimal) -> Result<(), FilterError> {
        if amount <= Decimal::ZERO {
            return Err(FilterError::NonPositiveAmount(amount));
        }
        self.trans_amount = amount;
        Ok(())
    }

    /// Add the tag if absent, remove it if present.
    ///
    /// Returns true when the tag is selected afterwards.
    pub fn toggle_pay_type(&mut self, tag: &str) -> bool {
        if let Some(pos) = self.pay_types.iter().position(|t| t == tag) {
            self.pay_types.remove(pos);
            false
        } else {
            self.pay_types.push(tag.to_string());
            true
        }
    }

    /// Check the filter is usable for a query
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.trans_amount <= Decimal::ZERO {
            return Err(FilterError::NonPositiveAmount(self.trans_amount));
        }
        Ok(())
    }
}

/// Invalid operator input for the filter
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Transaction amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("Unknown publisher type: {0}")]
    UnknownPublisherType(String),
}

/// Upstream quote feed failures
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure
    #[error("Quote request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success HTTP status
    #[error("Quote feed error: {status} - {body}")]
    Status { status: u16, body: String },
    /// Response body could not be decoded
    #[error("Failed to decode quote response: {0}")]
    Decode(String),
    /// Advertised price is not a decimal
    #[error("Invalid price in quote: {0}")]
    InvalidPrice(String),
}
