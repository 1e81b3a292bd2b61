//! Nutri-Score letter grades.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Nutri-Score letter grade, as computed by the remote database.
///
/// Anything that is not a single `a`-`e` letter (for example `"unknown"`,
/// `"not-applicable"` or an empty string) maps to [`NutritionGrade::Unknown`].
///
/// # Example
///
/// ```
/// use foodscan_model::NutritionGrade;
///
/// let grade = NutritionGrade::parse("C");
/// assert_eq!(grade, NutritionGrade::C);
/// assert_eq!(grade.css_class(), "nutrition-grade-c");
/// assert_eq!(NutritionGrade::parse("not-applicable"), NutritionGrade::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutritionGrade {
    /// Best nutritional quality.
    A,
    /// Good.
    B,
    /// Average.
    C,
    /// Poor.
    D,
    /// Worst nutritional quality.
    E,
    /// No grade available.
    #[default]
    Unknown,
}

impl NutritionGrade {
    /// Parse a grade letter case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" => Self::A,
            "b" => Self::B,
            "c" => Self::C,
            "d" => Self::D,
            "e" => Self::E,
            _ => Self::Unknown,
        }
    }

    /// Parse an optional grade, treating `None` as unknown.
    #[must_use]
    pub fn from_optional(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    /// Lowercase letter, or `"unknown"`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::E => "e",
            Self::Unknown => "unknown",
        }
    }

    /// Presentation class for the grade badge. Empty for unknown grades.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::A => "nutrition-grade-a",
            Self::B => "nutrition-grade-b",
            Self::C => "nutrition-grade-c",
            Self::D => "nutrition-grade-d",
            Self::E => "nutrition-grade-e",
            Self::Unknown => "",
        }
    }

    /// Whether a real letter grade is present.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for NutritionGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_letters() {
        assert_eq!(NutritionGrade::parse("a"), NutritionGrade::A);
        assert_eq!(NutritionGrade::parse(" E "), NutritionGrade::E);
        assert_eq!(NutritionGrade::parse(""), NutritionGrade::Unknown);
        assert_eq!(NutritionGrade::parse("unknown"), NutritionGrade::Unknown);
        assert_eq!(NutritionGrade::from_optional(None), NutritionGrade::Unknown);
    }

    #[test]
    fn test_css_class() {
        assert_eq!(NutritionGrade::A.css_class(), "nutrition-grade-a");
        assert_eq!(NutritionGrade::Unknown.css_class(), "");
        assert!(!NutritionGrade::Unknown.is_known());
    }

    #[test]
    fn test_display_uppercase() {
        assert_eq!(NutritionGrade::B.to_string(), "B");
        assert_eq!(NutritionGrade::Unknown.to_string(), "UNKNOWN");
    }
}
