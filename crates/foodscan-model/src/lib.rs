//! Domain types for the Food Facts barcode scanner.
//!
//! This crate holds the types shared between barcode acquisition, product
//! lookup and product contribution:
//!
//! - [`barcode`]: Barcode values, symbologies and decoder configuration
//! - [`grade`]: Nutri-Score letter grades and their presentation classes
//! - [`nutriscore`]: Versioned Nutri-Score breakdowns (2023+ component schema,
//!   legacy flat schema, unavailable)
//! - [`product`]: The normalized, display-ready product view model
//! - [`contribution`]: The mutable draft submitted for missing products
//! - [`display`]: Small text helpers used when rendering chips and values
//!
//! Nothing in this crate performs I/O.

pub mod barcode;
pub mod contribution;
pub mod display;
pub mod grade;
pub mod nutriscore;
pub mod product;

pub use barcode::{Barcode, DecoderConfig, Symbology};
pub use contribution::{
    ContributionDraft, ImageAttachment, MAX_IMAGE_BYTES, NutrientInputs, ProductFlags, TagField,
    ValidationIssue, normalize_tag,
};
pub use display::{chip_label, format_nutrient, truncate_text};
pub use grade::NutritionGrade;
pub use nutriscore::{
    ComponentNutriScore, ComponentProductType, ComponentScoring, LegacyNutriScore,
    LegacyProductType, NutriScoreComponent, NutriScoreComponents, NutriScoreSchema,
};
pub use product::{NutrientValue, NutritionFacts, ProductViewModel};
