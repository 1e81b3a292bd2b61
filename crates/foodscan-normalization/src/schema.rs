//! Nutri-Score schema selection.
//!
//! Selection order:
//!
//! 1. `nutriscore[nutriscore_version]` exists:
//!    - version ≥ 2023 with `data.components` → component schema
//!    - otherwise with `data` → legacy schema (versioned)
//! 2. Flat grade, score or nutriments present → legacy schema (flat)
//! 3. Nothing → unavailable

use serde_json::{Map, Value};

use foodscan_model::{
    ComponentNutriScore, ComponentProductType, ComponentScoring, LegacyNutriScore,
    LegacyProductType, NutriScoreComponent, NutriScoreComponents, NutriScoreSchema,
    NutritionGrade,
};

use crate::raw::RawProduct;
use crate::value::{flag, number, optional_flag, text};

/// First version using the component-based layout.
const COMPONENT_SCHEMA_VERSION: u32 = 2023;

/// Pick the Nutri-Score schema carried by a product record.
pub fn select_schema(product: &RawProduct) -> NutriScoreSchema {
    if let Some(schema) = versioned_schema(product) {
        return schema;
    }
    if let Some(schema) = flat_schema(product) {
        return schema;
    }
    tracing::debug!("no Nutri-Score data in product record");
    NutriScoreSchema::Unavailable
}

/// Grade from the flat top-level fields.
pub(crate) fn flat_grade(product: &RawProduct) -> NutritionGrade {
    let grade = NutritionGrade::from_optional(product.nutrition_grades.as_deref());
    if grade.is_known() {
        grade
    } else {
        NutritionGrade::from_optional(product.nutriscore_grade.as_deref())
    }
}

fn versioned_schema(product: &RawProduct) -> Option<NutriScoreSchema> {
    let version = text(product.nutriscore_version.as_ref())?;
    let entry = product.nutriscore.as_ref()?.get(&version)?.as_object()?;
    let data = entry.get("data").and_then(Value::as_object)?;

    let grade = match NutritionGrade::from_optional(entry.get("grade").and_then(Value::as_str)) {
        NutritionGrade::Unknown => flat_grade(product),
        known => known,
    };
    let score = number(entry.get("score"));
    let applicable = flag(entry.get("nutriscore_applicable"));
    let computed = flag(entry.get("nutriscore_computed"));

    let numeric_version = version.parse::<u32>().unwrap_or(0);
    if numeric_version >= COMPONENT_SCHEMA_VERSION
        && let Some(components) = data.get("components").and_then(Value::as_object)
    {
        tracing::debug!(version = %version, "selected component Nutri-Score schema");
        return Some(NutriScoreSchema::Component(ComponentNutriScore {
            version,
            grade,
            score,
            components: component_breakdown(components),
            scoring: ComponentScoring {
                negative_points: number(data.get("negative_points")),
                negative_points_max: number(data.get("negative_points_max")),
                positive_points: number(data.get("positive_points")),
                positive_points_max: number(data.get("positive_points_max")),
                count_proteins: optional_flag(data.get("count_proteins")),
                count_proteins_reason: text(data.get("count_proteins_reason")),
            },
            product_type: ComponentProductType {
                is_beverage: flag(data.get("is_beverage")),
                is_cheese: flag(data.get("is_cheese")),
                is_fat_oil_nuts_seeds: flag(data.get("is_fat_oil_nuts_seeds")),
                is_red_meat_product: flag(data.get("is_red_meat_product")),
                is_water: flag(data.get("is_water")),
            },
            applicable,
            computed,
        }));
    }

    tracing::debug!(version = %version, "selected legacy Nutri-Score schema");
    Some(NutriScoreSchema::Legacy(LegacyNutriScore {
        version: Some(version),
        grade,
        score,
        components: legacy_breakdown(data),
        negative_points: number(data.get("negative_points")),
        positive_points: number(data.get("positive_points")),
        product_type: LegacyProductType {
            is_beverage: flag(data.get("is_beverage")),
            is_cheese: flag(data.get("is_cheese")),
            is_fat: flag(data.get("is_fat")),
            is_water: flag(data.get("is_water")),
        },
        applicable,
        computed,
    }))
}

/// Legacy schema from the flat `nutrition_grades` and `nutriments` fields.
///
/// Components always read the `_100g` values: Nutri-Score inputs are defined
/// per 100 g, whatever `nutrition_data_per` says about the facts table.
fn flat_schema(product: &RawProduct) -> Option<NutriScoreSchema> {
    let grade = flat_grade(product);
    let score = number(product.nutriscore_score.as_ref());
    if !grade.is_known() && score.is_none() && !product.has_nutriments() {
        return None;
    }
    tracing::debug!("selected flat legacy Nutri-Score schema");

    let flat = |key: &str, max_points: f64, unit: &str, scale: f64| {
        number(product.nutriment(&format!("{key}_100g"))).map(|value| NutriScoreComponent {
            value: Some(value * scale),
            points: None,
            max_points: Some(max_points),
            unit: Some(unit.to_string()),
        })
    };

    Some(NutriScoreSchema::Legacy(LegacyNutriScore {
        version: None,
        grade,
        score,
        components: NutriScoreComponents {
            energy: flat("energy", 10.0, "kJ", 1.0),
            sugars: flat("sugars", 10.0, "g", 1.0),
            saturated_fat: flat("saturated-fat", 10.0, "g", 1.0),
            salt: None,
            sodium: flat("sodium", 10.0, "mg", 1000.0),
            fiber: flat("fiber", 5.0, "g", 1.0),
            fruits_vegetables: flat(
                "fruits-vegetables-nuts-estimate-from-ingredients",
                5.0,
                "%",
                1.0,
            ),
            proteins: flat("proteins", 5.0, "g", 1.0),
        },
        negative_points: None,
        positive_points: None,
        product_type: LegacyProductType::default(),
        applicable: grade.is_known(),
        computed: score.is_some(),
    }))
}

/// Components from the 2023 `negative` / `positive` lists.
fn component_breakdown(components: &Map<String, Value>) -> NutriScoreComponents {
    let find = |group: &str, id: &str| -> Option<NutriScoreComponent> {
        components
            .get(group)?
            .as_array()?
            .iter()
            .filter_map(Value::as_object)
            .find(|component| component.get("id").and_then(Value::as_str) == Some(id))
            .map(|component| NutriScoreComponent {
                value: number(component.get("value")),
                points: number(component.get("points")),
                max_points: number(component.get("points_max")),
                unit: text(component.get("unit")),
            })
    };

    NutriScoreComponents {
        energy: find("negative", "energy"),
        sugars: find("negative", "sugars"),
        saturated_fat: find("negative", "saturated_fat"),
        salt: find("negative", "salt"),
        sodium: None,
        fiber: find("positive", "fiber"),
        fruits_vegetables: find("positive", "fruits_vegetables_legumes"),
        proteins: find("positive", "proteins"),
    }
}

/// Components from the pre-2023 `<name>_value` / `<name>_points` fields.
fn legacy_breakdown(data: &Map<String, Value>) -> NutriScoreComponents {
    let field = |name: &str, max_points: f64, unit: &str| {
        let value = number(data.get(&format!("{name}_value")));
        let points = number(data.get(&format!("{name}_points")));
        (value.is_some() || points.is_some()).then(|| NutriScoreComponent {
            value,
            points,
            max_points: Some(max_points),
            unit: Some(unit.to_string()),
        })
    };

    NutriScoreComponents {
        energy: field("energy", 10.0, "kJ"),
        sugars: field("sugars", 10.0, "g"),
        saturated_fat: field("saturated_fat", 10.0, "g"),
        salt: None,
        sodium: field("sodium", 10.0, "mg"),
        fiber: field("fiber", 5.0, "g"),
        fruits_vegetables: field("fruits_vegetables_nuts_colza_walnut_olive_oils", 5.0, "%"),
        proteins: field("proteins", 5.0, "g"),
    }
}
