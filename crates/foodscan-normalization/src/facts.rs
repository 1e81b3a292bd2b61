//! Nutrition facts extraction from the flat `nutriments` map.

use foodscan_model::{NutriScoreComponent, NutriScoreSchema, NutrientValue, NutritionFacts};

use crate::raw::RawProduct;
use crate::value::{number, text};

/// Reference quantity assumed when the record does not state one.
pub(crate) const DEFAULT_DATA_PER: &str = "100g";

/// Build the nutrition facts table.
///
/// Values are read per the product's reference quantity. Nutrients missing
/// from `nutriments` are filled from the Nutri-Score breakdown when it
/// reports them.
pub(crate) fn nutrition_facts(product: &RawProduct, schema: &NutriScoreSchema) -> NutritionFacts {
    let suffix = if product.nutrition_data_per.as_deref() == Some("serving") {
        "_serving"
    } else {
        "_100g"
    };
    let reader = NutrimentReader { product, suffix };
    let components = schema.components().cloned().unwrap_or_default();

    NutritionFacts {
        energy: reader
            .energy()
            .or_else(|| component_value(components.energy.as_ref(), "kJ")),
        proteins: reader
            .read("proteins", "g")
            .or_else(|| component_value(components.proteins.as_ref(), "g")),
        sugars: reader
            .read("sugars", "g")
            .or_else(|| component_value(components.sugars.as_ref(), "g")),
        fat: reader.read("fat", "g"),
        saturated_fat: reader
            .read("saturated-fat", "g")
            .or_else(|| component_value(components.saturated_fat.as_ref(), "g")),
        salt: reader
            .read("salt", "g")
            .or_else(|| component_value(components.salt.as_ref(), "g")),
        sodium: reader
            .read("sodium", "g")
            .or_else(|| component_value(components.sodium.as_ref(), "mg")),
        fiber: reader
            .read("fiber", "g")
            .or_else(|| component_value(components.fiber.as_ref(), "g")),
        fruits_vegetables: reader
            .read("fruits-vegetables-nuts-estimate-from-ingredients", "%")
            .or_else(|| component_value(components.fruits_vegetables.as_ref(), "%")),
    }
}

fn component_value(
    component: Option<&NutriScoreComponent>,
    default_unit: &str,
) -> Option<NutrientValue> {
    let component = component?;
    let value = component.value?;
    let unit = component.unit.as_deref().unwrap_or(default_unit);
    Some(NutrientValue::new(value, unit))
}

struct NutrimentReader<'a> {
    product: &'a RawProduct,
    suffix: &'static str,
}

impl NutrimentReader<'_> {
    /// `<key><suffix>`, then the bare `<key>`.
    fn value(&self, key: &str) -> Option<f64> {
        number(self.product.nutriment(&format!("{key}{}", self.suffix)))
            .or_else(|| number(self.product.nutriment(key)))
    }

    fn read(&self, key: &str, default_unit: &str) -> Option<NutrientValue> {
        let value = self.value(key)?;
        let unit = text(self.product.nutriment(&format!("{key}_unit")))
            .unwrap_or_else(|| default_unit.to_string());
        Some(NutrientValue::new(value, unit))
    }

    /// Energy prefers kcal; plain `energy` is always normalized to kJ.
    fn energy(&self) -> Option<NutrientValue> {
        if let Some(kcal) = self.value("energy-kcal") {
            return Some(NutrientValue::new(kcal, "kcal"));
        }
        self.value("energy").map(|kj| NutrientValue::new(kj, "kJ"))
    }
}
