use foodscan_model::{NutriScoreSchema, NutrientValue, NutritionGrade, ProductViewModel, chip_label};
use foodscan_normalization::{normalize_product, parse_envelope};

fn load(body: &[u8]) -> ProductViewModel {
    let envelope = parse_envelope(body).unwrap();
    let code = envelope.code.clone().unwrap_or_default();
    normalize_product(&code, &envelope.product.unwrap())
}

fn summary(view: &ProductViewModel) -> String {
    let mut lines = vec![
        format!("name: {}", view.name),
        format!("grade: {}", view.grade_class()),
        format!("source: {}", view.nutrition_data_source()),
        format!("brands: {}", view.brands.join(" | ")),
        format!(
            "labels: {}",
            view.labels.iter().map(|l| chip_label(l)).collect::<Vec<_>>().join(" | ")
        ),
        format!("image: {}", view.image_url.as_deref().unwrap_or("-")),
    ];
    for (label, value) in view.nutrition.rows() {
        lines.push(format!("{label}: {value}"));
    }
    lines.join("\n")
}

#[test]
fn example_cola_renders_name_and_grade() {
    let view = load(include_bytes!("fixtures/example_cola.json"));

    assert_eq!(view.name, "Example Cola");
    assert_eq!(view.grade_class(), "nutrition-grade-c");
    assert_eq!(view.code, "5000112637922");
    insta::assert_snapshot!(summary(&view), @r"
name: Example Cola
grade: nutrition-grade-c
source: nutriments
brands: Example Drinks | Example Co
labels: green-dot
image: https://images.openfoodfacts.org/images/products/500/011/263/7922/front_en.jpg
Energy: 42 kcal
Proteins: 0 g
Sugars: 10.6 g
Fat: 0 g
Saturated Fat: 0 g
Salt: 0.02 g
Sodium: 0.008 g
Fiber: N/A
Fruits Vegetables: N/A
");
}

#[test]
fn component_schema_for_2023_products() {
    let view = load(include_bytes!("fixtures/component_2023.json"));

    let NutriScoreSchema::Component(score) = &view.nutri_score else {
        panic!("expected component schema, got {:?}", view.nutri_score);
    };
    assert_eq!(view.nutrition_data_source(), "nutriscore_2023");
    assert_eq!(score.grade, NutritionGrade::E);
    assert_eq!(score.score, Some(27.0));
    assert!(score.applicable && score.computed);
    assert_eq!(score.scoring.count_proteins, Some(false));
    assert_eq!(score.scoring.negative_points_max, Some(55.0));

    let sugars = score.components.sugars.as_ref().unwrap();
    assert_eq!(sugars.points, Some(14.0));
    assert_eq!(sugars.max_points, Some(15.0));
    assert!(score.components.sodium.is_none());

    // Values missing from nutriments come from the breakdown.
    assert_eq!(view.nutrition.energy, Some(NutrientValue::new(539.0, "kcal")));
    assert_eq!(view.nutrition.salt, Some(NutrientValue::new(0.107, "g")));
    assert_eq!(view.nutrition.proteins, Some(NutrientValue::new(6.3, "g")));
}

#[test]
fn legacy_schema_for_older_versions() {
    let view = load(include_bytes!("fixtures/legacy_2021.json"));

    let NutriScoreSchema::Legacy(score) = &view.nutri_score else {
        panic!("expected legacy schema, got {:?}", view.nutri_score);
    };
    assert_eq!(view.grade, NutritionGrade::D);
    assert_eq!(view.nutrition_data_source(), "nutriscore_2021");
    assert_eq!(view.nutri_score.points(), (Some(19.0), Some(1.0)));

    let fruits = score.components.fruits_vegetables.as_ref().unwrap();
    assert_eq!(fruits.unit.as_deref(), Some("%"));
    assert_eq!(fruits.max_points, Some(5.0));
    assert_eq!(view.nutrition.sodium, Some(NutrientValue::new(280.0, "mg")));
}

#[test]
fn flat_fields_produce_legacy_schema() {
    let view = load(include_bytes!("fixtures/flat_nutriments.json"));

    assert_eq!(view.grade_class(), "nutrition-grade-a");
    assert_eq!(view.nutrition_data_source(), "nutriments");
    // A zero score is a real score.
    assert_eq!(view.nutri_score.score(), Some(0.0));
    assert_eq!(view.allergens, vec!["en:milk"]);
    assert_eq!(view.nutrition.energy, Some(NutrientValue::new(250.0, "kJ")));
}

#[test]
fn missing_nutriscore_is_unavailable() {
    let view = load(include_bytes!("fixtures/no_nutriscore.json"));

    assert_eq!(view.nutri_score, NutriScoreSchema::Unavailable);
    assert_eq!(view.nutrition_data_source(), "none");
    assert_eq!(view.grade_class(), "");
    assert!(view.nutrition.is_empty());
    assert!(view.image_url.unwrap().ends_with("front.jpg"));
}

#[test]
fn unknown_barcode_has_no_product() {
    let envelope = parse_envelope(include_bytes!("fixtures/not_found.json")).unwrap();
    assert!(envelope.product.is_none());
    assert_eq!(envelope.status_verbose.as_deref(), Some("product not found"));
}

#[test]
fn view_model_serializes_schema_tag() {
    let view = load(include_bytes!("fixtures/component_2023.json"));
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["nutri_score"]["schema"], "component");
    assert_eq!(json["grade"], "e");
}
