//! Product lookup and contribution against the Open Food Facts API.
//!
//! # Overview
//!
//! - [`OpenFoodFactsClient`]: blocking `GET /api/v2/product/{code}.json`
//!   behind the [`ProductService`] trait
//! - [`LookupWorkflow`]: loading flag, normalization, observer callbacks
//! - [`ContributionClient`]: multipart `POST /cgi/product_jqm2.pl` behind the
//!   [`ContributionService`] trait, fed by [`form_fields`]
//! - [`InstallationId`]: per-installation UUID sent with contributions
//!
//! Requests carry an `Accept: application/json` header and a
//! `User-Agent` of the form `<app>/<version> (<contact>)`. Nothing is
//! retried or cached.
//!
//! # Example
//!
//! ```no_run
//! use foodscan_lookup::{LookupSettings, LookupWorkflow, NoopObserver, OpenFoodFactsClient};
//! use foodscan_model::Barcode;
//!
//! fn show() -> foodscan_lookup::Result<()> {
//!     let client = OpenFoodFactsClient::new(LookupSettings::default())?;
//!     let mut workflow = LookupWorkflow::new(client);
//!     let barcode = Barcode::parse("3017620422003").unwrap();
//!     let product = workflow.lookup(&barcode, &mut NoopObserver)?;
//!     println!("{} ({})", product.name, product.grade);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod contribution;
mod error;
mod identity;
mod workflow;

pub use client::{OpenFoodFactsClient, ProductService, interpret_response};
pub use config::{AppInfo, DEFAULT_BASE_URL, LookupSettings, STAGING_BASE_URL};
pub use contribution::{
    ContributionClient, ContributionReceipt, ContributionService, FormField, form_fields,
    interpret_contribution_response, submit_contribution,
};
pub use error::{CONTRIBUTION_FAILED_MESSAGE, ContributionError, LookupError, Result};
pub use identity::{INSTALLATION_ID_FILE, InstallationId};
pub use workflow::{LookupObserver, LookupWorkflow, NoopObserver};
