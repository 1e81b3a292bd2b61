//! Wiring between barcode acquisition and product lookup.
//!
//! Every acquisition action that yields a barcode triggers one lookup; the
//! outcome is reported back to the scanner so its session reflects it.

use std::time::Duration;

use foodscan_acquisition::{Camera, Decoder, ImageSource, Scanner};
use foodscan_lookup::{LookupObserver, LookupWorkflow, ProductService};
use foodscan_model::{Barcode, ProductViewModel};
use tracing::{debug, info};

/// Result of one acquisition plus lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Found(ProductViewModel),
    /// No product to show. `barcode` is set when acquisition succeeded
    /// and only the lookup failed.
    Failed {
        barcode: Option<Barcode>,
        message: String,
        not_found: bool,
    },
}

impl ScanOutcome {
    #[must_use]
    pub fn product(&self) -> Option<&ProductViewModel> {
        match self {
            Self::Found(product) => Some(product),
            Self::Failed { .. } => None,
        }
    }
}

/// Logs loading transitions at debug level.
#[derive(Debug, Default)]
pub struct LogObserver;

impl LookupObserver for LogObserver {
    fn on_loading(&mut self, loading: bool) {
        debug!(loading, "lookup loading");
    }

    fn on_found(&mut self, product: &ProductViewModel) {
        debug!(code = %product.code, "product ready");
    }

    fn on_error(&mut self, message: &str) {
        debug!(message, "lookup error shown");
    }
}

/// Scanner plus lookup workflow.
pub struct App<D, C, S> {
    scanner: Scanner<D, C>,
    workflow: LookupWorkflow<S>,
}

impl<D: Decoder, C: Camera, S: ProductService> App<D, C, S> {
    pub fn new(scanner: Scanner<D, C>, workflow: LookupWorkflow<S>) -> Self {
        Self { scanner, workflow }
    }

    #[must_use]
    pub fn scanner(&self) -> &Scanner<D, C> {
        &self.scanner
    }

    #[must_use]
    pub fn workflow(&self) -> &LookupWorkflow<S> {
        &self.workflow
    }

    pub fn manual(&mut self, text: &str) -> ScanOutcome {
        let lookup = self.scanner.manual_entry(text);
        self.resolve(lookup)
    }

    pub fn image(&mut self, source: ImageSource) -> ScanOutcome {
        let lookup = self.scanner.choose_image(source);
        self.resolve(lookup)
    }

    /// Start a live scan and wait up to `timeout` for a detection.
    ///
    /// The capture is stopped on timeout.
    pub fn live(&mut self, timeout: Duration) -> ScanOutcome {
        self.scanner.start_live_scan();
        if !self.scanner.session().is_live_scanning() {
            return self.resolve(None);
        }
        info!(timeout_secs = timeout.as_secs(), "waiting for a barcode");

        let lookup = self.scanner.wait_for_detection(timeout);
        if lookup.is_none() && self.scanner.session().is_live_scanning() {
            self.scanner.stop_live_scan();
            return ScanOutcome::Failed {
                barcode: None,
                message: format!("No barcode detected within {} seconds.", timeout.as_secs()),
                not_found: false,
            };
        }
        self.resolve(lookup)
    }

    fn resolve(&mut self, lookup: Option<Barcode>) -> ScanOutcome {
        let Some(barcode) = lookup else {
            let session = self.scanner.session();
            return ScanOutcome::Failed {
                barcode: session.barcode().cloned(),
                message: session.error().unwrap_or("No barcode entered.").to_string(),
                not_found: false,
            };
        };

        match self.workflow.lookup(&barcode, &mut LogObserver) {
            Ok(product) => {
                self.scanner.product_found();
                ScanOutcome::Found(product)
            }
            Err(err) => {
                let message = err.user_message();
                self.scanner.lookup_failed(message.clone());
                ScanOutcome::Failed {
                    barcode: Some(barcode),
                    message,
                    not_found: err.is_not_found(),
                }
            }
        }
    }
}
