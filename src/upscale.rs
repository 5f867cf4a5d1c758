//! Smooth upscaling of segmented seals.
//!
//! This is a pure high-quality resize (Lanczos3). Nothing here sharpens the
//! image. Resampling runs on alpha-premultiplied values so the RGB left
//! behind in transparent background pixels cannot bleed into the ink edges.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};
use tracing::debug;

use crate::error::{Error, Result};

/// Scale factor used when the caller does not pick one.
pub const DEFAULT_SCALE: f32 = 2.0;

/// Largest output, in pixels, that [`upscale`] will allocate.
pub const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

/// Resampling filter for upscaling.
const FILTER: FilterType = FilterType::Lanczos3;

type PremultipliedImage = ImageBuffer<Rgba<f32>, Vec<f32>>;

/// Output dimensions for `scale`: each side is rounded to the nearest pixel,
/// and a non-empty side never collapses below one pixel.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scaled_dimensions(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let side = |len: u32| -> u32 {
        if len == 0 {
            return 0;
        }
        let scaled = (f64::from(len) * f64::from(scale)).round();
        scaled.clamp(1.0, f64::from(u32::MAX)) as u32
    };
    (side(width), side(height))
}

/// Resize `image` by `scale` in both directions.
///
/// # Errors
///
/// Returns [`Error::InvalidScale`] if `scale` is zero, negative, NaN or
/// infinite, or if the output would exceed [`MAX_OUTPUT_PIXELS`].
pub fn upscale(image: &RgbaImage, scale: f32) -> Result<RgbaImage> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::InvalidScale(scale));
    }

    let (width, height) = scaled_dimensions(image.width(), image.height(), scale);
    if u64::from(width) * u64::from(height) > MAX_OUTPUT_PIXELS {
        return Err(Error::InvalidScale(scale));
    }
    if width == 0 || height == 0 {
        return Ok(RgbaImage::new(width, height));
    }

    let resized = imageops::resize(&premultiply(image), width, height, FILTER);
    debug!(
        from_width = image.width(),
        from_height = image.height(),
        width,
        height,
        "Upscaled seal"
    );
    Ok(unpremultiply(&resized))
}

fn premultiply(image: &RgbaImage) -> PremultipliedImage {
    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = f32::from(a) / 255.0;
        let channel = |v: u8| f32::from(v) / 255.0 * alpha;
        Rgba([channel(r), channel(g), channel(b), alpha])
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unpremultiply(image: &PremultipliedImage) -> RgbaImage {
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = a.clamp(0.0, 1.0);
        let alpha_u8 = to_u8(alpha);
        if alpha_u8 == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        Rgba([to_u8(r / alpha), to_u8(g / alpha), to_u8(b / alpha), alpha_u8])
    })
}
