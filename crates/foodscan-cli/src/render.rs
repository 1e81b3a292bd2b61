//! Terminal rendering for products, contributions and symbologies.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use foodscan_lookup::FormField;
use foodscan_model::{
    DecoderConfig, NutritionGrade, ProductViewModel, Symbology, chip_label, truncate_text,
};

/// Longest chip list value shown before truncation.
const MAX_LIST_CHARS: usize = 80;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn grade_color(grade: NutritionGrade) -> Color {
    match grade {
        NutritionGrade::A => Color::DarkGreen,
        NutritionGrade::B => Color::Green,
        NutritionGrade::C => Color::Yellow,
        NutritionGrade::D => Color::DarkYellow,
        NutritionGrade::E => Color::Red,
        NutritionGrade::Unknown => Color::Grey,
    }
}

fn chips(tags: &[String]) -> String {
    if tags.is_empty() {
        return "-".to_string();
    }
    let joined = tags
        .iter()
        .map(String::as_str)
        .map(chip_label)
        .collect::<Vec<_>>()
        .join(", ");
    truncate_text(&joined, MAX_LIST_CHARS)
}

/// Product card: identity, grade, tag lists.
#[must_use]
pub fn product_table(product: &ProductViewModel) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);

    table.add_row(vec![Cell::new("Name"), Cell::new(&product.name).add_attribute(Attribute::Bold)]);
    table.add_row(vec![Cell::new("Barcode"), Cell::new(&product.code)]);
    table.add_row(vec![
        Cell::new("Nutri-Score"),
        Cell::new(product.grade.to_string()).fg(grade_color(product.grade)),
    ]);
    if let Some(score) = product.nutri_score.score() {
        table.add_row(vec![Cell::new("Score"), Cell::new(score)]);
    }
    table.add_row(vec![Cell::new("Brands"), Cell::new(chips(&product.brands))]);
    table.add_row(vec![Cell::new("Categories"), Cell::new(chips(&product.categories))]);
    table.add_row(vec![Cell::new("Labels"), Cell::new(chips(&product.labels))]);
    table.add_row(vec![Cell::new("Allergens"), Cell::new(chips(&product.allergens))]);
    table.add_row(vec![Cell::new("Ingredients"), Cell::new(chips(&product.ingredients))]);
    if let Some(url) = &product.image_url {
        table.add_row(vec![Cell::new("Image"), Cell::new(url)]);
    }
    table
}

/// Nutrition facts, one row per nutrient.
#[must_use]
pub fn nutrition_table(product: &ProductViewModel) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![
        header_cell("Nutrient"),
        header_cell(&format!("Per {}", product.nutrition_data_per)),
    ]);
    for (label, value) in product.nutrition.rows() {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Full human-readable product output.
#[must_use]
pub fn product_text(product: &ProductViewModel) -> String {
    format!(
        "{}\n{}\nNutrition data: {}",
        product_table(product),
        nutrition_table(product),
        product.nutrition_data_source()
    )
}

/// Multipart fields as they would be sent.
#[must_use]
pub fn form_table(fields: &[FormField<'_>]) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    for field in fields {
        let value = match field {
            FormField::Text { value, .. } => value.clone(),
            FormField::File { image, .. } => format!(
                "{} ({}, {} bytes)",
                image.file_name,
                image.media_type,
                image.bytes.len()
            ),
        };
        table.add_row(vec![Cell::new(field.name()), Cell::new(value)]);
    }
    table
}

/// Supported symbologies, marking the enabled ones.
#[must_use]
pub fn symbology_table(config: &DecoderConfig) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![
        header_cell("Id"),
        header_cell("Symbology"),
        header_cell("Enabled"),
    ]);
    for symbology in Symbology::ALL {
        let enabled = if config.accepts(symbology) {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(symbology.id()),
            Cell::new(symbology.label()),
            enabled.set_alignment(CellAlignment::Center),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use foodscan_model::ImageAttachment;

    use super::*;

    #[test]
    fn test_chips_empty_and_prefixed() {
        assert_eq!(chips(&[]), "-");
        let tags = vec!["en:green-dot".to_string(), "en:vegan".to_string()];
        let text = chips(&tags);
        assert!(text.contains(&chip_label("en:green-dot")));
        assert!(text.contains(", "));
    }

    #[test]
    fn test_symbology_table_marks_disabled() {
        let config = DecoderConfig::with_symbologies([Symbology::Ean13]);
        let mut table = symbology_table(&config);
        table.force_no_tty();
        let rendered = table.to_string();
        assert!(rendered.contains("EAN-13"));
        assert!(rendered.contains("code39_vin"));
        assert_eq!(rendered.matches("yes").count(), 1);
        assert_eq!(rendered.matches(" no ").count(), 6);
    }

    #[test]
    fn test_form_table_describes_files() {
        let image = ImageAttachment::new("front.png", vec![0u8; 12]).unwrap();
        let fields = vec![
            FormField::Text {
                name: "code".to_string(),
                value: "5000112637922".to_string(),
            },
            FormField::File {
                name: "images[0]".to_string(),
                image: &image,
            },
        ];
        let mut table = form_table(&fields);
        table.force_no_tty();
        let rendered = table.to_string();
        assert!(rendered.contains("5000112637922"));
        assert!(rendered.contains("front.png (image/png, 12 bytes)"));
    }
}
