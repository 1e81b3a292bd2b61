//! Raw product record to view model.

use serde_json::Value;

use foodscan_model::ProductViewModel;

use crate::facts::{DEFAULT_DATA_PER, nutrition_facts};
use crate::raw::RawProduct;
use crate::schema::select_schema;

/// Name shown when the record has no usable product name.
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

/// Split a comma-separated field into trimmed, non-empty entries.
///
/// ```
/// use foodscan_normalization::split_tags;
///
/// assert_eq!(split_tags(Some("Coca-Cola, Coke ,")), vec!["Coca-Cola", "Coke"]);
/// assert!(split_tags(None).is_empty());
/// ```
pub fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|text| {
        text.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Pick the best available product image.
///
/// Front display images are preferred in English, then in the product's
/// own language, then in any language. The flat URL fields follow.
pub fn select_image_url(product: &RawProduct) -> Option<String> {
    front_display_image(product).or_else(|| {
        [
            &product.image_front_url,
            &product.image_url,
            &product.image_front_small_url,
            &product.image_small_url,
        ]
        .into_iter()
        .flatten()
        .find(|url| !url.trim().is_empty())
        .cloned()
    })
}

fn front_display_image(product: &RawProduct) -> Option<String> {
    let display = product
        .selected_images
        .as_ref()?
        .get("front")?
        .get("display")?
        .as_object()?;

    let url_for = |lang: &str| {
        display
            .get(lang)
            .and_then(Value::as_str)
            .filter(|url| !url.trim().is_empty())
    };

    url_for("en")
        .or_else(|| product.lang.as_deref().and_then(url_for))
        .or_else(|| {
            display
                .values()
                .filter_map(Value::as_str)
                .find(|url| !url.trim().is_empty())
        })
        .map(str::to_string)
}

/// Normalize a product record into the display view model.
///
/// `code` is the barcode that was looked up; the record's own `code` is only
/// used when `code` is blank. This function never fails: every missing field
/// degrades to an empty or placeholder value.
pub fn normalize_product(code: &str, product: &RawProduct) -> ProductViewModel {
    let nutri_score = select_schema(product);
    let grade = nutri_score.grade();
    let nutrition = nutrition_facts(product, &nutri_score);

    let code = if code.trim().is_empty() {
        product.code.clone().unwrap_or_default()
    } else {
        code.trim().to_string()
    };

    let name = product
        .product_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_PRODUCT_NAME)
        .to_string();

    let allergens = match &product.allergens_hierarchy {
        Some(hierarchy) if !hierarchy.is_empty() => hierarchy.clone(),
        _ => split_tags(product.allergens_from_ingredients.as_deref()),
    };

    let nutrition_data_per = product
        .nutrition_data_per
        .as_deref()
        .map(str::trim)
        .filter(|per| !per.is_empty())
        .unwrap_or(DEFAULT_DATA_PER)
        .to_string();

    let view = ProductViewModel {
        code,
        name,
        brands: split_tags(product.brands.as_deref()),
        categories: split_tags(product.categories.as_deref()),
        keywords: product.keywords.clone().unwrap_or_default(),
        grade,
        nutri_score,
        nutrition,
        nutrition_data_per,
        allergens,
        labels: product.labels_hierarchy.clone().unwrap_or_default(),
        ingredients: product.ingredients_tags.clone().unwrap_or_default(),
        image_url: select_image_url(product),
    };

    tracing::debug!(
        code = %view.code,
        grade = %view.grade.as_str(),
        source = %view.nutrition_data_source(),
        "normalized product"
    );
    view
}
