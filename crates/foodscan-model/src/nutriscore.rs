//! Versioned Nutri-Score breakdowns.
//!
//! The remote database has published two incompatible Nutri-Score layouts:
//!
//! - **2023+**: a component list split into `negative` and `positive` groups,
//!   each entry carrying its own value, points, maximum points and unit.
//! - **Legacy** (pre-2023): flat `<nutrient>_value` / `<nutrient>_points`
//!   fields with fixed maxima, or no breakdown at all when only the flat
//!   `nutrition_grades` and `nutriments` fields are present.
//!
//! [`NutriScoreSchema`] is the single tagged union the rest of the workspace
//! works with; which variant applies is decided by the normalizer.

use serde::{Deserialize, Serialize};

use crate::grade::NutritionGrade;

/// One scored nutrient within a Nutri-Score breakdown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NutriScoreComponent {
    /// Measured amount, if reported.
    pub value: Option<f64>,
    /// Points awarded for this component.
    pub points: Option<f64>,
    /// Maximum points this component can contribute.
    pub max_points: Option<f64>,
    /// Unit of `value` (for example `g`, `kJ`, `%`).
    pub unit: Option<String>,
}

/// Named components shared by both schema versions.
///
/// The 2023 schema reports `salt`; the legacy schema reports `sodium`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NutriScoreComponents {
    pub energy: Option<NutriScoreComponent>,
    pub sugars: Option<NutriScoreComponent>,
    pub saturated_fat: Option<NutriScoreComponent>,
    pub salt: Option<NutriScoreComponent>,
    pub sodium: Option<NutriScoreComponent>,
    pub fiber: Option<NutriScoreComponent>,
    pub fruits_vegetables: Option<NutriScoreComponent>,
    pub proteins: Option<NutriScoreComponent>,
}

/// Point totals reported by the 2023 algorithm.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentScoring {
    pub negative_points: Option<f64>,
    pub negative_points_max: Option<f64>,
    pub positive_points: Option<f64>,
    pub positive_points_max: Option<f64>,
    pub count_proteins: Option<bool>,
    pub count_proteins_reason: Option<String>,
}

/// Product-type flags used by the 2023 algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentProductType {
    pub is_beverage: bool,
    pub is_cheese: bool,
    pub is_fat_oil_nuts_seeds: bool,
    pub is_red_meat_product: bool,
    pub is_water: bool,
}

/// Product-type flags used by the legacy algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegacyProductType {
    pub is_beverage: bool,
    pub is_cheese: bool,
    pub is_fat: bool,
    pub is_water: bool,
}

/// Component-based Nutri-Score (2023 and newer).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentNutriScore {
    pub version: String,
    pub grade: NutritionGrade,
    pub score: Option<f64>,
    pub components: NutriScoreComponents,
    pub scoring: ComponentScoring,
    pub product_type: ComponentProductType,
    pub applicable: bool,
    pub computed: bool,
}

/// Flat-field Nutri-Score (pre-2023 algorithm).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LegacyNutriScore {
    /// Version key of the block this was read from; `None` when built from
    /// the flat top-level fields.
    pub version: Option<String>,
    pub grade: NutritionGrade,
    pub score: Option<f64>,
    pub components: NutriScoreComponents,
    pub negative_points: Option<f64>,
    pub positive_points: Option<f64>,
    pub product_type: LegacyProductType,
    pub applicable: bool,
    pub computed: bool,
}

/// Nutri-Score breakdown in whichever schema the response carried.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum NutriScoreSchema {
    /// 2023+ component-based breakdown.
    Component(ComponentNutriScore),
    /// Pre-2023 flat breakdown.
    Legacy(LegacyNutriScore),
    /// No Nutri-Score information in the response.
    #[default]
    Unavailable,
}

impl NutriScoreSchema {
    /// Letter grade carried by the breakdown.
    #[must_use]
    pub fn grade(&self) -> NutritionGrade {
        match self {
            Self::Component(score) => score.grade,
            Self::Legacy(score) => score.grade,
            Self::Unavailable => NutritionGrade::Unknown,
        }
    }

    /// Numeric score, if the breakdown has one.
    #[must_use]
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Component(score) => score.score,
            Self::Legacy(score) => score.score,
            Self::Unavailable => None,
        }
    }

    /// Scored components, if any.
    #[must_use]
    pub fn components(&self) -> Option<&NutriScoreComponents> {
        match self {
            Self::Component(score) => Some(&score.components),
            Self::Legacy(score) => Some(&score.components),
            Self::Unavailable => None,
        }
    }

    /// Negative and positive point totals, if reported.
    #[must_use]
    pub fn points(&self) -> (Option<f64>, Option<f64>) {
        match self {
            Self::Component(score) => (
                score.scoring.negative_points,
                score.scoring.positive_points,
            ),
            Self::Legacy(score) => (score.negative_points, score.positive_points),
            Self::Unavailable => (None, None),
        }
    }

    /// Label describing where the breakdown came from.
    ///
    /// `nutriscore_<version>` for versioned blocks, `nutriments` for the flat
    /// top-level fields and `none` when unavailable.
    #[must_use]
    pub fn source(&self) -> String {
        match self {
            Self::Component(score) => format!("nutriscore_{}", score.version),
            Self::Legacy(LegacyNutriScore {
                version: Some(version),
                ..
            }) => format!("nutriscore_{version}"),
            Self::Legacy(_) => "nutriments".to_string(),
            Self::Unavailable => "none".to_string(),
        }
    }
}
