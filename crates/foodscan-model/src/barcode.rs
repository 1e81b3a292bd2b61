//! Barcode values and decoder configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A non-empty product code, as decoded from an image or typed by the user.
///
/// The value is trimmed on construction. No format is enforced: manual entry
/// accepts any text and the remote service decides whether a product exists.
///
/// # Example
///
/// ```
/// use foodscan_model::Barcode;
///
/// let code = Barcode::parse("  5000112637922 ").unwrap();
/// assert_eq!(code.as_str(), "5000112637922");
/// assert!(Barcode::parse("   ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Barcode(String);

impl Barcode {
    /// Parse a barcode, returning `None` for empty or whitespace-only input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code consists only of ASCII digits.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.0.bytes().all(|b| b.is_ascii_digit())
    }

    /// Validate the trailing GS1 mod-10 check digit.
    ///
    /// Applies to EAN-8, UPC-A (12), EAN-13 and GTIN-14 lengths. Returns
    /// `false` for any other length or for non-numeric codes.
    #[must_use]
    pub fn has_valid_check_digit(&self) -> bool {
        if !self.is_numeric() || !matches!(self.0.len(), 8 | 12 | 13 | 14) {
            return false;
        }
        let digits: Vec<u32> = self.0.bytes().map(|b| u32::from(b - b'0')).collect();
        let (body, check) = digits.split_at(digits.len() - 1);
        let sum: u32 = body
            .iter()
            .rev()
            .enumerate()
            .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
            .sum();
        (10 - sum % 10) % 10 == check[0]
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Barcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Barcode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| "barcode must not be empty".to_string())
    }
}

impl From<Barcode> for String {
    fn from(value: Barcode) -> Self {
        value.0
    }
}

/// Printed symbologies the decoder can be asked to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    /// EAN-13 (13-digit retail code).
    Ean13,
    /// EAN-8 (short retail code).
    Ean8,
    /// Code 128.
    Code128,
    /// Code 39.
    Code39,
    /// Code 39 with VIN validation.
    Code39Vin,
    /// UPC-A (12-digit North American retail code).
    #[serde(rename = "upca", alias = "upc_a")]
    UpcA,
    /// UPC-E (zero-suppressed UPC).
    #[serde(rename = "upce", alias = "upc_e")]
    UpcE,
}

impl Symbology {
    /// Every supported symbology, in display order.
    pub const ALL: [Symbology; 7] = [
        Self::Ean13,
        Self::Ean8,
        Self::Code128,
        Self::Code39,
        Self::Code39Vin,
        Self::UpcA,
        Self::UpcE,
    ];

    /// Stable identifier used in configuration files and CLI flags.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Ean13 => "ean13",
            Self::Ean8 => "ean8",
            Self::Code128 => "code128",
            Self::Code39 => "code39",
            Self::Code39Vin => "code39_vin",
            Self::UpcA => "upca",
            Self::UpcE => "upce",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ean13 => "EAN-13",
            Self::Ean8 => "EAN-8",
            Self::Code128 => "Code 128",
            Self::Code39 => "Code 39",
            Self::Code39Vin => "Code 39 (VIN)",
            Self::UpcA => "UPC-A",
            Self::UpcE => "UPC-E",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Symbology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "ean13" => Ok(Self::Ean13),
            "ean8" => Ok(Self::Ean8),
            "code128" => Ok(Self::Code128),
            "code39" => Ok(Self::Code39),
            "code39vin" => Ok(Self::Code39Vin),
            "upca" | "upc" => Ok(Self::UpcA),
            "upce" => Ok(Self::UpcE),
            _ => Err(format!("unknown symbology: {s}")),
        }
    }
}

/// Decoder settings shared by still-image and live-stream decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Symbologies the decoder should try, in priority order.
    pub symbologies: Vec<Symbology>,
}

impl DecoderConfig {
    /// Build a configuration for an explicit subset of symbologies.
    ///
    /// Duplicates are dropped, keeping the first occurrence.
    #[must_use]
    pub fn with_symbologies(symbologies: impl IntoIterator<Item = Symbology>) -> Self {
        let mut selected = Vec::new();
        for symbology in symbologies {
            if !selected.contains(&symbology) {
                selected.push(symbology);
            }
        }
        Self {
            symbologies: selected,
        }
    }

    /// Whether a symbology is enabled.
    #[must_use]
    pub fn accepts(&self, symbology: Symbology) -> bool {
        self.symbologies.contains(&symbology)
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::with_symbologies(Symbology::ALL)
    }
}
