//! Text helpers for rendering chips and nutrient values.

use crate::product::NutrientValue;

/// Chips longer than this are truncated.
pub const CHIP_MAX_CHARS: usize = 50;

/// Truncate `text` to `max_chars` characters, appending `...` when cut.
///
/// Counts characters, not bytes, so multi-byte text is never split.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

/// Label for a tag chip: strips a two-letter language prefix such as `en:`
/// and truncates long values.
///
/// ```
/// use foodscan_model::chip_label;
///
/// assert_eq!(chip_label("en:gluten"), "gluten");
/// assert_eq!(chip_label("Organic"), "Organic");
/// ```
#[must_use]
pub fn chip_label(tag: &str) -> String {
    let stripped = match tag.split_once(':') {
        Some((lang, rest)) if lang.len() == 2 && lang.chars().all(|c| c.is_ascii_lowercase()) => {
            rest
        }
        _ => tag,
    };
    truncate_text(stripped, CHIP_MAX_CHARS)
}

/// Format a nutrient as `"<value> <unit>"`, or `N/A` when missing.
#[must_use]
pub fn format_nutrient(value: Option<&NutrientValue>) -> String {
    match value {
        Some(nutrient) if nutrient.unit.is_empty() => format_number(nutrient.value),
        Some(nutrient) => format!("{} {}", format_number(nutrient.value), nutrient.unit),
        None => "N/A".to_string(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 50), "short");
        let long = "x".repeat(60);
        let out = truncate_text(&long, 50);
        assert_eq!(out.len(), 53);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_text("ééééé", 2), "éé...");
    }

    #[test]
    fn test_chip_label_prefix() {
        assert_eq!(chip_label("fr:lait"), "lait");
        assert_eq!(chip_label("http://x"), "http://x");
        assert_eq!(chip_label("EN:milk"), "EN:milk");
    }

    #[test]
    fn test_format_nutrient() {
        assert_eq!(format_nutrient(None), "N/A");
        assert_eq!(
            format_nutrient(Some(&NutrientValue::new(10.6, "g"))),
            "10.6 g"
        );
        assert_eq!(format_nutrient(Some(&NutrientValue::new(0.125, "g"))), "0.125 g");
        assert_eq!(format_nutrient(Some(&NutrientValue::new(42.0, ""))), "42");
    }
}
