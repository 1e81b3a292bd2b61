//! Raw product response types.
//!
//! Only the fields the normalizer consumes are modeled. Fields whose JSON
//! type varies between records are kept as [`serde_json::Value`].

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::NormalizationError;

/// Top-level body of `GET /api/v2/product/{code}.json`.
///
/// `product` is absent when the code is unknown to the database.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductEnvelope {
    pub code: Option<String>,
    pub product: Option<RawProduct>,
    pub status: Option<Value>,
    pub status_verbose: Option<String>,
}

/// Consumed subset of a product record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProduct {
    pub code: Option<String>,
    pub lang: Option<String>,
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub categories: Option<String>,
    #[serde(rename = "_keywords")]
    pub keywords: Option<Vec<String>>,

    /// Flat grade (pre-2023 responses, still present on newer ones).
    pub nutrition_grades: Option<String>,
    pub nutriscore_grade: Option<String>,
    pub nutriscore_score: Option<Value>,

    /// Version key selecting an entry of `nutriscore`; string or number.
    pub nutriscore_version: Option<Value>,
    /// Version-keyed Nutri-Score blocks.
    pub nutriscore: Option<Map<String, Value>>,
    pub nutriments: Option<Map<String, Value>>,
    pub nutrition_data_per: Option<String>,

    pub ingredients_tags: Option<Vec<String>>,
    pub allergens_hierarchy: Option<Vec<String>>,
    pub allergens_from_ingredients: Option<String>,
    pub labels_hierarchy: Option<Vec<String>>,

    pub selected_images: Option<Value>,
    pub image_front_url: Option<String>,
    pub image_url: Option<String>,
    pub image_front_small_url: Option<String>,
    pub image_small_url: Option<String>,
}

impl RawProduct {
    /// Look up a key in the flat nutriments map.
    pub(crate) fn nutriment(&self, key: &str) -> Option<&Value> {
        self.nutriments.as_ref()?.get(key)
    }

    /// Whether the flat nutriments map has any entries.
    pub(crate) fn has_nutriments(&self) -> bool {
        self.nutriments.as_ref().is_some_and(|map| !map.is_empty())
    }
}

/// Decode a response body.
pub fn parse_envelope(body: &[u8]) -> Result<ProductEnvelope, NormalizationError> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_has_no_product() {
        let envelope = parse_envelope(b"{}").unwrap();
        assert!(envelope.product.is_none());
    }

    #[test]
    fn test_null_fields_are_tolerated() {
        let envelope = parse_envelope(
            br#"{"status": 1, "product": {"product_name": null, "_keywords": null, "nutriments": null}}"#,
        )
        .unwrap();
        let product = envelope.product.unwrap();
        assert!(product.product_name.is_none());
        assert!(product.keywords.is_none());
        assert!(!product.has_nutriments());
    }

    #[test]
    fn test_not_json_is_error() {
        assert!(parse_envelope(b"<html>").is_err());
    }
}
