//! Seal segmentation and recoloring.
//!
//! Every pixel ends up either fully transparent (background, RGB left
//! untouched) or fully opaque in the exact target color (ink). No partial
//! alpha is ever produced, so the output can be recolored or traced without
//! edge fringes.
//!
//! Segmenting an output again with the same settings reproduces it only when
//! the target color is itself classified as ink. Otherwise the second pass
//! clears every pixel (black mode with the default red target, for example).

use image::{DynamicImage, Rgb, Rgba, RgbaImage};
use tracing::debug;

use crate::classifier::Classifier;
use crate::error::Result;
use crate::settings::ProcessingSettings;

/// Pixel counts from one segmentation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coverage {
    /// Pixels classified as ink.
    pub kept: u64,
    /// Pixels examined.
    pub total: u64,
}

impl Coverage {
    /// Fraction of pixels kept, in `[0, 1]`. Zero for an empty image.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.kept as f32 / self.total as f32
        }
    }
}

/// Segment `source` into a new RGBA buffer of the same dimensions.
///
/// The source is not modified. Any pixel format is accepted; its alpha
/// channel (if any) is carried into the buffer but ignored by the
/// classifier.
///
/// # Errors
///
/// Returns [`Error::UnsupportedDetectionMode`](crate::Error::UnsupportedDetectionMode)
/// if the settings select a mode without a classifier.
pub fn segment(
    source: &DynamicImage,
    settings: &ProcessingSettings,
) -> Result<(RgbaImage, Coverage)> {
    let mut output = source.to_rgba8();
    let coverage = segment_in_place(&mut output, settings)?;
    Ok((output, coverage))
}

/// Segment an RGBA buffer in place.
///
/// # Errors
///
/// Returns [`Error::UnsupportedDetectionMode`](crate::Error::UnsupportedDetectionMode)
/// if the settings select a mode without a classifier.
pub fn segment_in_place(image: &mut RgbaImage, settings: &ProcessingSettings) -> Result<Coverage> {
    let classifier = Classifier::new(settings)?;
    Ok(apply(image, &classifier, settings.target_rgb()))
}

/// Run an already-built classifier over `image`, recoloring kept pixels to
/// `target` and clearing the alpha of everything else.
pub fn apply(image: &mut RgbaImage, classifier: &Classifier, target: Rgb<u8>) -> Coverage {
    let Rgb([tr, tg, tb]) = target;
    let ink = Rgba([tr, tg, tb, u8::MAX]);
    let mut coverage = Coverage {
        kept: 0,
        total: u64::from(image.width()) * u64::from(image.height()),
    };

    for px in image.pixels_mut() {
        let [r, g, b, _] = px.0;
        if classifier.is_foreground(r, g, b) {
            *px = ink;
            coverage.kept += 1;
        } else {
            px[3] = 0;
        }
    }

    debug!(
        width = image.width(),
        height = image.height(),
        kept = coverage.kept,
        ratio = coverage.ratio(),
        "Segmented seal"
    );
    coverage
}
