//! Store error types

use thiserror::Error;

/// Sample store failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure talking to a remote store
    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Remote store answered with a non-success status
    #[error("Store error: {status} - {body}")]
    Status { status: u16, body: String },
    /// Local file failure
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Record could not be encoded or decoded
    #[error("Store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Status {
            status: 500,
            body: "Error saving data".to_string(),
        };
        assert_eq!(err.to_string(), "Store error: 500 - Error saving data");

        let err = StoreError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.to_string(), "Store I/O error: denied");
    }
}
