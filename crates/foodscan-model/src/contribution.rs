//! Draft data for contributing a missing product.
//!
//! A [`ContributionDraft`] accumulates what the user types into the
//! contribution form: scalar fields, tag lists, Nutri-Score inputs and image
//! attachments. It lives for the duration of the form and is submitted as a
//! single multipart request.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::barcode::Barcode;
use crate::grade::NutritionGrade;

/// Largest image accepted as an attachment (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Tag-list fields of the contribution form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagField {
    Brands,
    Categories,
    Labels,
    Allergens,
    Ingredients,
    DataSources,
}

impl TagField {
    /// All tag fields, in submission order.
    pub const ALL: [TagField; 6] = [
        Self::Brands,
        Self::Categories,
        Self::Labels,
        Self::Allergens,
        Self::Ingredients,
        Self::DataSources,
    ];

    /// Form field name, without the trailing `[]`.
    #[must_use]
    pub const fn form_key(&self) -> &'static str {
        match self {
            Self::Brands => "brands_tags",
            Self::Categories => "categories_tags",
            Self::Labels => "labels_tags",
            Self::Allergens => "allergens_tags",
            Self::Ingredients => "ingredients_tags",
            Self::DataSources => "data_sources_tags",
        }
    }

    /// Whether values get the `en:` taxonomy prefix.
    #[must_use]
    pub const fn uses_language_prefix(&self) -> bool {
        !matches!(self, Self::DataSources)
    }
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Brands => "brands",
            Self::Categories => "categories",
            Self::Labels => "labels",
            Self::Allergens => "allergens",
            Self::Ingredients => "ingredients",
            Self::DataSources => "data sources",
        };
        f.write_str(label)
    }
}

/// Normalize free text into a taxonomy tag.
///
/// Lowercases, collapses whitespace runs into `-`, and prefixes `en:` for
/// fields that use the language taxonomy. Returns `None` for blank input.
///
/// ```
/// use foodscan_model::{TagField, normalize_tag};
///
/// assert_eq!(
///     normalize_tag(TagField::Brands, "  Coca  Cola "),
///     Some("en:coca-cola".to_string())
/// );
/// assert_eq!(
///     normalize_tag(TagField::DataSources, "Label Photo"),
///     Some("label-photo".to_string())
/// );
/// ```
#[must_use]
pub fn normalize_tag(field: TagField, raw: &str) -> Option<String> {
    let body = raw
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if body.is_empty() {
        return None;
    }
    if !field.uses_language_prefix() {
        return Some(body);
    }
    if body.starts_with("en:") {
        Some(body)
    } else {
        Some(format!("en:{body}"))
    }
}

/// Numeric Nutri-Score inputs, per 100 g.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientInputs {
    pub energy: f64,
    pub fiber: f64,
    pub proteins: f64,
    pub saturated_fat: f64,
    pub sodium: f64,
    pub sugars: f64,
    pub fruits_vegetables_nuts_colza_walnut_olive_oils: f64,
}

impl NutrientInputs {
    /// `(form key, value)` pairs in submission order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("energy", self.energy),
            ("fiber", self.fiber),
            ("proteins", self.proteins),
            ("saturated_fat", self.saturated_fat),
            ("sodium", self.sodium),
            ("sugars", self.sugars),
            (
                "fruits_vegetables_nuts_colza_walnut_olive_oils",
                self.fruits_vegetables_nuts_colza_walnut_olive_oils,
            ),
        ]
    }

    /// Set a nutrient by form key. Returns `false` for unknown keys.
    ///
    /// Non-finite and negative inputs are stored as `0`.
    pub fn set(&mut self, key: &str, value: f64) -> bool {
        let value = if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        };
        let slot = match key {
            "energy" => &mut self.energy,
            "fiber" => &mut self.fiber,
            "proteins" => &mut self.proteins,
            "saturated_fat" => &mut self.saturated_fat,
            "sodium" => &mut self.sodium,
            "sugars" => &mut self.sugars,
            "fruits_vegetables_nuts_colza_walnut_olive_oils" | "fruits_vegetables" => {
                &mut self.fruits_vegetables_nuts_colza_walnut_olive_oils
            }
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// Product-type checkboxes of the contribution form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductFlags {
    pub is_beverage: bool,
    pub is_cheese: bool,
    pub is_fat: bool,
    pub is_water: bool,
}

impl ProductFlags {
    /// `(form key, 0/1)` pairs in submission order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, u8); 4] {
        [
            ("is_beverage", u8::from(self.is_beverage)),
            ("is_cheese", u8::from(self.is_cheese)),
            ("is_fat", u8::from(self.is_fat)),
            ("is_water", u8::from(self.is_water)),
        ]
    }
}

/// An image queued for upload with the contribution.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Validate and wrap image bytes.
    ///
    /// The media type is inferred from the file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ValidationIssue> {
        let file_name = file_name.into();
        let media_type = media_type_for(&file_name).ok_or_else(|| ValidationIssue::NotAnImage {
            file_name: file_name.clone(),
        })?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ValidationIssue::ImageTooLarge {
                file_name,
                size: bytes.len(),
            });
        }
        Ok(Self {
            file_name,
            media_type: media_type.to_string(),
            bytes,
        })
    }
}

impl fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

fn media_type_for(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

/// A reason a draft cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("product name is required")]
    MissingProductName,
    #[error("creator is required")]
    MissingCreator,
    #[error("at least one brand is required")]
    MissingBrand,
    #[error("File {file_name} is too large or not an image")]
    ImageTooLarge { file_name: String, size: usize },
    #[error("File {file_name} is too large or not an image")]
    NotAnImage { file_name: String },
}

/// Contribution form state for one barcode.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionDraft {
    pub code: Barcode,
    pub product_name: String,
    pub creator: String,
    brands: Vec<String>,
    categories: Vec<String>,
    labels: Vec<String>,
    allergens: Vec<String>,
    ingredients: Vec<String>,
    data_sources: Vec<String>,
    pub nutrients: NutrientInputs,
    pub flags: ProductFlags,
    pub grade: NutritionGrade,
    pub score: f64,
    images: Vec<ImageAttachment>,
}

impl ContributionDraft {
    /// Start an empty draft for the barcode that was not found.
    #[must_use]
    pub fn new(code: Barcode) -> Self {
        Self {
            code,
            product_name: String::new(),
            creator: String::new(),
            brands: Vec::new(),
            categories: Vec::new(),
            labels: Vec::new(),
            allergens: Vec::new(),
            ingredients: Vec::new(),
            data_sources: Vec::new(),
            nutrients: NutrientInputs::default(),
            flags: ProductFlags::default(),
            grade: NutritionGrade::Unknown,
            score: 0.0,
            images: Vec::new(),
        }
    }

    /// Tags currently held for a field.
    #[must_use]
    pub fn tags(&self, field: TagField) -> &[String] {
        match field {
            TagField::Brands => &self.brands,
            TagField::Categories => &self.categories,
            TagField::Labels => &self.labels,
            TagField::Allergens => &self.allergens,
            TagField::Ingredients => &self.ingredients,
            TagField::DataSources => &self.data_sources,
        }
    }

    fn tags_mut(&mut self, field: TagField) -> &mut Vec<String> {
        match field {
            TagField::Brands => &mut self.brands,
            TagField::Categories => &mut self.categories,
            TagField::Labels => &mut self.labels,
            TagField::Allergens => &mut self.allergens,
            TagField::Ingredients => &mut self.ingredients,
            TagField::DataSources => &mut self.data_sources,
        }
    }

    /// Normalize and add a tag. Returns `false` when blank or already present.
    pub fn add_tag(&mut self, field: TagField, raw: &str) -> bool {
        let Some(tag) = normalize_tag(field, raw) else {
            return false;
        };
        let tags = self.tags_mut(field);
        if tags.contains(&tag) {
            return false;
        }
        tags.push(tag);
        true
    }

    /// Remove a tag by its normalized value.
    pub fn remove_tag(&mut self, field: TagField, tag: &str) -> bool {
        let tags = self.tags_mut(field);
        let before = tags.len();
        tags.retain(|existing| existing != tag);
        tags.len() != before
    }

    /// Queue an image for upload.
    pub fn attach_image(&mut self, image: ImageAttachment) {
        self.images.push(image);
    }

    /// Drop the image at `index`, if any.
    pub fn remove_image(&mut self, index: usize) -> Option<ImageAttachment> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    #[must_use]
    pub fn images(&self) -> &[ImageAttachment] {
        &self.images
    }

    /// Check the required fields: product name, creator and one brand.
    pub fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        if self.product_name.trim().is_empty() {
            issues.push(ValidationIssue::MissingProductName);
        }
        if self.creator.trim().is_empty() {
            issues.push(ValidationIssue::MissingCreator);
        }
        if self.brands.is_empty() {
            issues.push(ValidationIssue::MissingBrand);
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// Reset everything except the barcode, as after a successful submit.
    pub fn reset(&mut self) {
        *self = Self::new(self.code.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn draft() -> ContributionDraft {
        ContributionDraft::new(Barcode::parse("4006381333931").unwrap())
    }

    #[test]
    fn test_add_tag_dedupes_in_order() {
        let mut draft = draft();
        assert!(draft.add_tag(TagField::Brands, "Acme Foods"));
        assert!(draft.add_tag(TagField::Brands, "Other"));
        assert!(!draft.add_tag(TagField::Brands, "  acme   foods"));
        assert!(!draft.add_tag(TagField::Brands, "   "));
        assert_eq!(draft.tags(TagField::Brands), ["en:acme-foods", "en:other"]);
    }

    #[test]
    fn test_remove_tag() {
        let mut draft = draft();
        draft.add_tag(TagField::Labels, "Organic");
        assert!(draft.remove_tag(TagField::Labels, "en:organic"));
        assert!(!draft.remove_tag(TagField::Labels, "en:organic"));
        assert!(draft.tags(TagField::Labels).is_empty());
    }

    #[test]
    fn test_validate_requires_name_creator_brand() {
        let mut draft = draft();
        let issues = draft.validate().unwrap_err();
        assert_eq!(
            issues,
            vec![
                ValidationIssue::MissingProductName,
                ValidationIssue::MissingCreator,
                ValidationIssue::MissingBrand
            ]
        );

        draft.product_name = "Sparkling Water".to_string();
        draft.creator = "tester".to_string();
        draft.add_tag(TagField::Brands, "Acme");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_nutrient_inputs_clamp() {
        let mut inputs = NutrientInputs::default();
        assert!(inputs.set("sugars", 4.5));
        assert!(inputs.set("fiber", -2.0));
        assert!(inputs.set("proteins", f64::NAN));
        assert!(!inputs.set("vitamin_c", 1.0));
        assert_eq!(inputs.sugars, 4.5);
        assert_eq!(inputs.fiber, 0.0);
        assert_eq!(inputs.proteins, 0.0);
    }

    #[test]
    fn test_image_attachment_checks() {
        assert!(ImageAttachment::new("front.JPG", vec![0; 16]).is_ok());
        assert!(matches!(
            ImageAttachment::new("notes.txt", vec![0; 16]),
            Err(ValidationIssue::NotAnImage { .. })
        ));
        assert!(matches!(
            ImageAttachment::new("huge.png", vec![0; MAX_IMAGE_BYTES + 1]),
            Err(ValidationIssue::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn test_reset_keeps_code() {
        let mut draft = draft();
        draft.product_name = "x".to_string();
        draft.attach_image(ImageAttachment::new("a.png", vec![1]).unwrap());
        draft.reset();
        assert_eq!(draft.code.as_str(), "4006381333931");
        assert!(draft.product_name.is_empty());
        assert!(draft.images().is_empty());
    }

    proptest! {
        #[test]
        fn normalized_tags_are_stable(raw in "[A-Za-z ]{0,24}") {
            if let Some(tag) = normalize_tag(TagField::Categories, &raw) {
                prop_assert!(tag.starts_with("en:"));
                prop_assert!(!tag.contains(' '));
                prop_assert_eq!(normalize_tag(TagField::Categories, &tag), Some(tag.clone()));
            }
        }
    }
}
