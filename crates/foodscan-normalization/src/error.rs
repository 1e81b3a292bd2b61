//! Normalization error types.

use thiserror::Error;

/// Errors raised while reading a product response.
///
/// Normalization itself never fails; only decoding the response body can.
#[derive(Debug, Error)]
pub enum NormalizationError {
    /// The body was not a JSON object of the expected shape.
    #[error("invalid product response: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
