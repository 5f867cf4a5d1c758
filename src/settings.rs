//! Per-invocation processing settings.
//!
//! Field names serialize in camelCase (`redSensitivity`, `targetColor`, ...)
//! so settings documents written for the web front end load unchanged.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::Rgb;
use serde::{Deserialize, Deserializer, Serialize};

use crate::color;
use crate::error::{Error, Result};

/// Upper bound of [`ProcessingSettings::red_sensitivity`].
pub const MAX_SENSITIVITY: u8 = 100;

/// Upper bound of [`ProcessingSettings::edge_softness`].
pub const MAX_EDGE_SOFTNESS: u8 = 10;

/// Which kind of ink the classifier looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// Red-dominant ink (the usual seal/stamp pad).
    #[default]
    Red,
    /// Dark, unsaturated ink.
    Black,
    /// Declared for compatibility with stored settings; has no classifier.
    Mixed,
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => f.write_str("red"),
            Self::Black => f.write_str("black"),
            Self::Mixed => f.write_str("mixed"),
        }
    }
}

impl FromStr for DetectionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "black" => Ok(Self::Black),
            "mixed" => Ok(Self::Mixed),
            _ => Err(Error::UnknownDetectionMode(s.to_string())),
        }
    }
}

/// Thresholds and target color for one segmentation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessingSettings {
    /// Classification strictness, 0-100. Red mode reads it as a channel
    /// dominance ratio, black mode as a saturation tolerance.
    #[serde(deserialize_with = "saturating_u8")]
    pub red_sensitivity: u8,
    /// Luminance cutoff, 0-255. Upper bound in red mode, inverted in black mode.
    #[serde(deserialize_with = "saturating_u8")]
    pub lightness_threshold: u8,
    /// Minimum `r - max(g, b)` margin in red mode, in raw channel units.
    #[serde(deserialize_with = "saturating_u8")]
    pub chroma_threshold: u8,
    /// Edge feathering, 0-10. Currently has no effect on the output.
    #[serde(deserialize_with = "saturating_u8")]
    pub edge_softness: u8,
    /// Recolor target as a `#rrggbb` string.
    pub target_color: String,
    /// Ink detection strategy.
    pub detection_mode: DetectionMode,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            red_sensitivity: 50,
            lightness_threshold: 220,
            chroma_threshold: 15,
            edge_softness: 2,
            target_color: "#d90000".to_string(),
            detection_mode: DetectionMode::Red,
        }
    }
}

impl ProcessingSettings {
    /// Parse settings from a JSON document. Missing keys take their defaults.
    ///
    /// Numeric values are rounded and clamped into their declared ranges, so
    /// `-5` reads as 0 and a sensitivity of 300 as 100.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Settings`] if the JSON is malformed or a field has the
    /// wrong type (for example a threshold given as a string).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.clamped())
    }

    /// Load settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or [`Error::Settings`]
    /// if its contents do not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Copy of these settings with every field inside its declared range.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            red_sensitivity: self.red_sensitivity.min(MAX_SENSITIVITY),
            edge_softness: self.edge_softness.min(MAX_EDGE_SOFTNESS),
            ..self.clone()
        }
    }

    /// The parsed recolor target, falling back to
    /// [`color::DEFAULT_TARGET_COLOR`] when `target_color` is malformed.
    #[must_use]
    pub fn target_rgb(&self) -> Rgb<u8> {
        color::parse_hex_color(&self.target_color)
    }
}

/// Read any JSON number into a `u8`, rounding and saturating at 0 and 255.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn saturating_u8<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.round().clamp(0.0, f64::from(u8::MAX)) as u8)
}
