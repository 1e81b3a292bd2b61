//! Open Food Facts product API client.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use foodscan_model::Barcode;
use foodscan_normalization::{ProductEnvelope, parse_envelope};

use crate::config::LookupSettings;
use crate::error::{LookupError, Result};

/// Remote product lookup.
///
/// Implementations perform one request per call: no retry, no cache.
pub trait ProductService {
    /// Fetch the product record for `barcode`.
    ///
    /// A successful response without a product is returned as an envelope
    /// whose `product` is `None`; deciding what that means is up to the caller.
    fn fetch_product(&self, barcode: &Barcode) -> Result<ProductEnvelope>;
}

/// Blocking HTTP client for `GET /api/v2/product/{code}.json`.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    client: Client,
    settings: LookupSettings,
}

impl OpenFoodFactsClient {
    /// Create a client with the configured identity headers and timeout.
    pub fn new(settings: LookupSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let user_agent = HeaderValue::from_str(&settings.app.user_agent())
            .map_err(|e| LookupError::Network(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| LookupError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    #[must_use]
    pub fn settings(&self) -> &LookupSettings {
        &self.settings
    }
}

impl ProductService for OpenFoodFactsClient {
    fn fetch_product(&self, barcode: &Barcode) -> Result<ProductEnvelope> {
        let url = self.settings.product_url(barcode.as_str())?;
        debug!("Fetching product from {}", url);

        let response = self.client.get(url).send()?;
        let status = response.status();
        let body = response.bytes()?;
        interpret_response(status, &body)
    }
}

/// Map a status and body onto an envelope or a typed error.
pub fn interpret_response(status: StatusCode, body: &[u8]) -> Result<ProductEnvelope> {
    if !status.is_success() {
        return Err(LookupError::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }
    Ok(parse_envelope(body)?)
}
