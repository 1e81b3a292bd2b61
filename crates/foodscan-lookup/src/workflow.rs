//! Barcode lookup workflow.
//!
//! Runs one lookup per call, tracks the loading flag and reports the outcome
//! to an observer. The barcode is never touched here; clearing it is the
//! acquisition side's business.

use foodscan_model::{Barcode, ProductViewModel};
use foodscan_normalization::normalize_product;
use tracing::{info, info_span, warn};

use crate::client::ProductService;
use crate::error::{LookupError, Result};

/// Receives lookup outcomes.
pub trait LookupObserver {
    /// The loading flag changed.
    fn on_loading(&mut self, _loading: bool) {}
    /// A product was found and normalized.
    fn on_found(&mut self, product: &ProductViewModel);
    /// The lookup failed; `message` is ready for display.
    fn on_error(&mut self, message: &str);
}

/// Observer that ignores every outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LookupObserver for NoopObserver {
    fn on_found(&mut self, _product: &ProductViewModel) {}
    fn on_error(&mut self, _message: &str) {}
}

/// Lookup state shown by the host: loading flag, last product, last error.
#[derive(Debug)]
pub struct LookupWorkflow<S> {
    service: S,
    loading: bool,
    product: Option<ProductViewModel>,
    error: Option<String>,
}

impl<S: ProductService> LookupWorkflow<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            loading: false,
            product: None,
            error: None,
        }
    }

    /// Look up `barcode`, notify `observer`, and return the outcome.
    pub fn lookup(
        &mut self,
        barcode: &Barcode,
        observer: &mut impl LookupObserver,
    ) -> Result<ProductViewModel> {
        let _span = info_span!("lookup", barcode = %barcode).entered();

        self.loading = true;
        self.product = None;
        self.error = None;
        observer.on_loading(true);
        let outcome = self.fetch(barcode);
        self.loading = false;
        observer.on_loading(false);

        match &outcome {
            Ok(product) => {
                info!(name = %product.name, grade = %product.grade.as_str(), "product found");
                self.product = Some(product.clone());
                observer.on_found(product);
            }
            Err(err) => {
                let message = err.user_message();
                warn!(error = %err, "lookup failed");
                self.error = Some(message.clone());
                observer.on_error(&message);
            }
        }
        outcome
    }

    fn fetch(&self, barcode: &Barcode) -> Result<ProductViewModel> {
        if !barcode.is_numeric() || !barcode.has_valid_check_digit() {
            tracing::debug!("barcode has no valid GTIN check digit, querying anyway");
        }
        let envelope = self.service.fetch_product(barcode)?;
        let product = envelope.product.ok_or_else(|| LookupError::NotFound {
            barcode: barcode.to_string(),
        })?;
        Ok(normalize_product(barcode.as_str(), &product))
    }

    /// Whether a lookup is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Product from the last successful lookup.
    #[must_use]
    pub fn product(&self) -> Option<&ProductViewModel> {
        self.product.as_ref()
    }

    /// Message from the last failed lookup.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }
}
