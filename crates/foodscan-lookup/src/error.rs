//! Error types for product lookup and contribution.

use std::path::PathBuf;

use foodscan_model::ValidationIssue;
use thiserror::Error;

/// Fallback shown when a contribution fails without a server message.
pub const CONTRIBUTION_FAILED_MESSAGE: &str = "Failed to contribute product. Please try again.";

/// Errors raised while looking up a barcode.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LookupError {
    /// The service answered but has no product for the barcode.
    #[error("no product data for barcode {barcode}")]
    NotFound {
        /// Barcode that was looked up.
        barcode: String,
    },

    /// The service answered with a non-success status.
    #[error("lookup service returned {status} {reason}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("invalid lookup response: {0}")]
    InvalidResponse(String),

    /// The configured host cannot carry a product path.
    #[error("invalid lookup URL: {0}")]
    InvalidUrl(String),
}

impl LookupError {
    /// Message displayed in place of the product card.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { barcode } => format!("No product data found for barcode: {barcode}"),
            Self::Http { status, reason } => format!("API Error: {status} - {reason}"),
            Self::Network(message) | Self::InvalidResponse(message) => message.clone(),
            Self::InvalidUrl(_) => self.to_string(),
        }
    }

    /// Whether the barcode is simply unknown to the database.
    ///
    /// Hosts use this to offer the contribution form.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
            || matches!(self, Self::Http { status: 404, .. })
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<foodscan_normalization::NormalizationError> for LookupError {
    fn from(err: foodscan_normalization::NormalizationError) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Errors raised while contributing a product.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContributionError {
    /// Required fields are missing.
    #[error("contribution is incomplete: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),

    /// An image could not be attached.
    #[error("invalid attachment: {0}")]
    Attachment(ValidationIssue),

    /// The request never produced a response.
    #[error("failed to submit contribution: {0}")]
    Submit(String),

    /// The service rejected the contribution.
    #[error("contribution rejected with status {status}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// `message` field of the response body, if present.
        message: Option<String>,
    },

    /// The installation identifier could not be read or stored.
    #[error("installation identifier error at {path}: {source}")]
    Identity {
        /// Identifier file.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContributionError {
    /// Message displayed above the contribution form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(issues) => join_issues(issues),
            Self::Attachment(issue) => issue.to_string(),
            Self::Http {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::Http { .. } | Self::Submit(_) => CONTRIBUTION_FAILED_MESSAGE.to_string(),
            Self::Identity { .. } => "Could not read or store the installation identifier.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ContributionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Submit(err.to_string())
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for lookup operations.
pub type Result<T> = std::result::Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_user_messages() {
        let err = LookupError::NotFound {
            barcode: "123".to_string(),
        };
        assert_eq!(err.user_message(), "No product data found for barcode: 123");
        assert!(err.is_not_found());

        let err = LookupError::Http {
            status: 500,
            reason: "Internal Server Error".to_string(),
        };
        assert_eq!(err.user_message(), "API Error: 500 - Internal Server Error");
        assert!(!err.is_not_found());

        let err = LookupError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), "connection refused");
    }

    #[test]
    fn test_contribution_user_messages() {
        let err = ContributionError::Http {
            status: 400,
            message: Some("Invalid code".to_string()),
        };
        assert_eq!(err.user_message(), "Invalid code");

        let err = ContributionError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), CONTRIBUTION_FAILED_MESSAGE);

        let err = ContributionError::Validation(vec![
            ValidationIssue::MissingProductName,
            ValidationIssue::MissingBrand,
        ]);
        assert_eq!(
            err.user_message(),
            "product name is required; at least one brand is required"
        );
    }
}
