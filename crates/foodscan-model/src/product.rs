//! Normalized product view model.

use serde::{Deserialize, Serialize};

use crate::display::format_nutrient;
use crate::grade::NutritionGrade;
use crate::nutriscore::NutriScoreSchema;

/// A nutrient amount with its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientValue {
    pub value: f64,
    pub unit: String,
}

impl NutrientValue {
    #[must_use]
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

/// Nutrition facts shown in the product card.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub energy: Option<NutrientValue>,
    pub proteins: Option<NutrientValue>,
    pub sugars: Option<NutrientValue>,
    pub fat: Option<NutrientValue>,
    pub saturated_fat: Option<NutrientValue>,
    pub salt: Option<NutrientValue>,
    pub sodium: Option<NutrientValue>,
    pub fiber: Option<NutrientValue>,
    pub fruits_vegetables: Option<NutrientValue>,
}

impl NutritionFacts {
    /// Labelled rows in display order, with `N/A` for missing values.
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Energy", format_nutrient(self.energy.as_ref())),
            ("Proteins", format_nutrient(self.proteins.as_ref())),
            ("Sugars", format_nutrient(self.sugars.as_ref())),
            ("Fat", format_nutrient(self.fat.as_ref())),
            ("Saturated Fat", format_nutrient(self.saturated_fat.as_ref())),
            ("Salt", format_nutrient(self.salt.as_ref())),
            ("Sodium", format_nutrient(self.sodium.as_ref())),
            ("Fiber", format_nutrient(self.fiber.as_ref())),
            (
                "Fruits Vegetables",
                format_nutrient(self.fruits_vegetables.as_ref()),
            ),
        ]
    }

    /// Whether no nutrient is present at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Display-ready projection of a remote product record.
///
/// Built by the normalizer from a lookup response; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductViewModel {
    /// Barcode the product was looked up with.
    pub code: String,
    /// Product name, `"Unknown Product"` when missing.
    pub name: String,
    pub brands: Vec<String>,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    /// Letter grade after schema selection.
    pub grade: NutritionGrade,
    /// Versioned Nutri-Score breakdown.
    pub nutri_score: NutriScoreSchema,
    pub nutrition: NutritionFacts,
    /// Reference quantity for nutrition values (for example `100g`).
    pub nutrition_data_per: String,
    pub allergens: Vec<String>,
    pub labels: Vec<String>,
    pub ingredients: Vec<String>,
    /// Best available product image.
    pub image_url: Option<String>,
}

impl ProductViewModel {
    /// Presentation class for the grade badge.
    #[must_use]
    pub fn grade_class(&self) -> &'static str {
        self.grade.css_class()
    }

    /// Where the Nutri-Score breakdown came from.
    #[must_use]
    pub fn nutrition_data_source(&self) -> String {
        self.nutri_score.source()
    }
}
