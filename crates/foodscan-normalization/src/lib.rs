//! Product response normalization.
//!
//! Maps the loosely-typed product records returned by the Open Food Facts
//! API onto the flat [`ProductViewModel`](foodscan_model::ProductViewModel)
//! the rest of the workspace renders.
//!
//! # Overview
//!
//! - **Raw types**: serde structs mirroring the consumed subset of the API
//! - **Schema selection**: picks the 2023+ component breakdown, the legacy
//!   flat breakdown, or none, based on which keys the response carries
//! - **View model building**: tag splitting, image URL selection, nutrient
//!   extraction with unit fallbacks
//!
//! # Example
//!
//! ```
//! use foodscan_normalization::{normalize_product, parse_envelope};
//!
//! let body = br#"{"product": {"product_name": "Example Cola", "nutrition_grades": "c"}}"#;
//! let envelope = parse_envelope(body).unwrap();
//! let product = envelope.product.unwrap();
//! let view = normalize_product("5000112637922", &product);
//!
//! assert_eq!(view.name, "Example Cola");
//! assert_eq!(view.grade_class(), "nutrition-grade-c");
//! ```
//!
//! # Design Principles
//!
//! - **Never fails**: missing or malformed fields degrade to defaults
//! - **One code path**: every schema version goes through the same builder

mod error;
mod facts;
mod normalizer;
mod raw;
mod schema;
mod value;

pub use error::NormalizationError;
pub use normalizer::{UNKNOWN_PRODUCT_NAME, normalize_product, select_image_url, split_tags};
pub use raw::{ProductEnvelope, RawProduct, parse_envelope};
pub use schema::select_schema;
