//! Configuration for the lookup and contribution clients.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{LookupError, Result};

/// Default Open Food Facts host.
pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";

/// Staging host accepting test contributions.
pub const STAGING_BASE_URL: &str = "https://world.openfoodfacts.net";

/// Application identity sent with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    /// Contact address embedded in the User-Agent.
    pub contact: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: "FoodFactsApp".to_string(),
            version: "1.1".to_string(),
            contact: "foodfacts@example.com".to_string(),
        }
    }
}

impl AppInfo {
    /// `User-Agent` header value: `<name>/<version> (<contact>)`.
    #[must_use]
    pub fn user_agent(&self) -> String {
        format!("{}/{} ({})", self.name, self.version, self.contact)
    }
}

/// Settings for talking to the product database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    /// Host used for product lookups.
    pub base_url: String,
    /// Host used for contributions.
    pub contribution_base_url: String,
    /// Lookup timeout in milliseconds.
    pub timeout_ms: u64,
    /// Contribution timeout in milliseconds.
    pub contribution_timeout_ms: u64,
    pub app: AppInfo,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            contribution_base_url: STAGING_BASE_URL.to_string(),
            timeout_ms: 10_000,
            contribution_timeout_ms: 30_000,
            app: AppInfo::default(),
        }
    }
}

impl LookupSettings {
    /// Settings pointed at another lookup host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `{base_url}/api/v2/product/{code}.json` with the code percent-encoded
    /// as a single path segment.
    pub fn product_url(&self, code: &str) -> Result<Url> {
        let invalid = |detail: &str| LookupError::InvalidUrl(format!("{}: {detail}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|err| invalid(&err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("not a base URL"))?
            .pop_if_empty()
            .extend(["api", "v2", "product"])
            .push(&format!("{code}.json"));
        Ok(url)
    }

    /// `{contribution_base_url}/cgi/product_jqm2.pl`.
    #[must_use]
    pub fn contribution_url(&self) -> String {
        format!(
            "{}/cgi/product_jqm2.pl",
            self.contribution_base_url.trim_end_matches('/')
        )
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn contribution_timeout(&self) -> Duration {
        Duration::from_millis(self.contribution_timeout_ms)
    }
}
