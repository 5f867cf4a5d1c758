//! Per-pixel ink classification.
//!
//! Two detection strategies share one user-facing strictness knob
//! (`red_sensitivity`):
//!
//! - **Red**: the pixel must be no lighter than `lightness_threshold`, red must
//!   dominate green and blue by a ratio of `1 + sensitivity / 100`, and red must
//!   exceed the stronger of the two by at least `chroma_threshold`.
//! - **Black**: the pixel must be darker than `255 - lightness_threshold` and
//!   its channel spread must stay below `sensitivity / 2`.
//!
//! Only RGB is read; the source alpha channel never influences the decision.

use crate::error::{Error, Result};
use crate::settings::{DetectionMode, ProcessingSettings};

/// How a detection mode reads the shared `red_sensitivity` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sensitivity {
    /// Red must exceed green and blue by this factor, in `[1.0, 2.0]`.
    DominanceRatio(f64),
    /// Largest `max - min` channel spread still counted as neutral ink.
    SaturationTolerance(f64),
}

impl Sensitivity {
    /// Interpret `red_sensitivity` for the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDetectionMode`] for [`DetectionMode::Mixed`].
    pub fn for_mode(mode: DetectionMode, red_sensitivity: u8) -> Result<Self> {
        let value = f64::from(red_sensitivity);
        match mode {
            DetectionMode::Red => Ok(Self::DominanceRatio(1.0 + value / 100.0)),
            DetectionMode::Black => Ok(Self::SaturationTolerance(value / 2.0)),
            DetectionMode::Mixed => Err(Error::UnsupportedDetectionMode(mode)),
        }
    }
}

/// A foreground/background decision rule with its thresholds resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classifier {
    /// Red-dominant ink.
    Red {
        /// Brightest accepted average lightness (inclusive).
        max_lightness: f64,
        /// Required red-over-green and red-over-blue factor.
        dominance_ratio: f64,
        /// Required `r - max(g, b)` margin.
        min_chroma: i16,
    },
    /// Dark neutral ink.
    Black {
        /// Average lightness must be strictly below this.
        darkness_cutoff: f64,
        /// Channel spread must be strictly below this.
        saturation_tolerance: f64,
    },
}

impl Classifier {
    /// Build the classifier for `settings`, clamping them to their declared
    /// ranges first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDetectionMode`] when the settings select
    /// [`DetectionMode::Mixed`].
    pub fn new(settings: &ProcessingSettings) -> Result<Self> {
        let settings = settings.clamped();
        let lightness = f64::from(settings.lightness_threshold);

        match Sensitivity::for_mode(settings.detection_mode, settings.red_sensitivity)? {
            Sensitivity::DominanceRatio(dominance_ratio) => Ok(Self::Red {
                max_lightness: lightness,
                dominance_ratio,
                min_chroma: i16::from(settings.chroma_threshold),
            }),
            Sensitivity::SaturationTolerance(saturation_tolerance) => Ok(Self::Black {
                darkness_cutoff: 255.0 - lightness,
                saturation_tolerance,
            }),
        }
    }

    /// Whether a pixel with these channel values belongs to the seal.
    #[must_use]
    pub fn is_foreground(&self, r: u8, g: u8, b: u8) -> bool {
        let (rf, gf, bf) = (f64::from(r), f64::from(g), f64::from(b));
        let lightness = (rf + gf + bf) / 3.0;

        match *self {
            Self::Red {
                max_lightness,
                dominance_ratio,
                min_chroma,
            } => {
                let reddish = rf > gf * dominance_ratio && rf > bf * dominance_ratio;
                let chroma = i16::from(r) - i16::from(g.max(b));
                lightness <= max_lightness && reddish && chroma >= min_chroma
            }
            Self::Black {
                darkness_cutoff,
                saturation_tolerance,
            } => {
                let saturation = r.max(g).max(b) - r.min(g).min(b);
                lightness < darkness_cutoff && f64::from(saturation) < saturation_tolerance
            }
        }
    }
}
