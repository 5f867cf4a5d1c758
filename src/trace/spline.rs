//! Curve-fitted tracing backed by `vtracer`.

use image::RgbaImage;
use visioncortex::PathSimplifyMode;
use vtracer::{convert, ColorImage, ColorMode, Config, Hierarchical};

use super::{TraceOptions, Tracer, ALPHA_CUTOFF};
use crate::error::{Error, Result};

/// Corner angle (degrees) below which vtracer keeps a vertex sharp.
const RIGHT_ANGLE_CORNER_THRESHOLD: i32 = 60;
/// Corner threshold that smooths every vertex.
const SMOOTH_CORNER_THRESHOLD: i32 = 180;

/// Fill vtracer gives the foreground of a binary trace.
const BINARY_FILL: &str = r##"fill="#000000""##;

/// Spline tracer using the `vtracer` library.
///
/// The input is reduced to an ink/background mask before tracing, so only
/// pixels with alpha above [`ALPHA_CUTOFF`] become paths. Each path is
/// filled with the color of the first ink pixel.
#[derive(Debug, Clone, Default)]
pub struct SplineTracer {
    options: TraceOptions,
}

impl SplineTracer {
    /// Create a tracer with explicit options.
    #[must_use]
    pub fn new(options: TraceOptions) -> Self {
        Self { options }
    }

    /// The options this tracer runs with.
    #[must_use]
    pub fn options(&self) -> &TraceOptions {
        &self.options
    }
}

impl Tracer for SplineTracer {
    fn name(&self) -> &'static str {
        "vtracer"
    }

    fn trace(&self, image: &RgbaImage) -> Result<String> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::Trace(format!("cannot trace a {width}x{height} image")));
        }

        let svg = convert(ink_mask(image), vtracer_config(&self.options)).map_err(Error::Trace)?;
        let document = match ink_color(image) {
            Some(fill) => svg.to_string().replace(BINARY_FILL, &format!(r#"fill="{fill}""#)),
            None => svg.to_string(),
        };

        if self.options.emit_viewbox {
            with_viewbox(&document, width, height)
        } else {
            Ok(document)
        }
    }
}

/// Opaque black where `image` has ink, opaque white everywhere else.
fn ink_mask(image: &RgbaImage) -> ColorImage {
    let mut pixels = Vec::with_capacity(image.as_raw().len());
    for px in image.pixels() {
        let level = if px[3] > ALPHA_CUTOFF { 0 } else { u8::MAX };
        pixels.extend_from_slice(&[level, level, level, u8::MAX]);
    }
    ColorImage {
        pixels,
        width: image.width() as usize,
        height: image.height() as usize,
    }
}

/// `#RRGGBB` of the first ink pixel, if there is any ink.
fn ink_color(image: &RgbaImage) -> Option<String> {
    image
        .pixels()
        .find(|px| px[3] > ALPHA_CUTOFF)
        .map(|px| format!("#{:02X}{:02X}{:02X}", px[0], px[1], px[2]))
}

/// Translate the fixed tracing profile into vtracer's parameters.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn vtracer_config(options: &TraceOptions) -> Config {
    // vtracer measures speckles by side length, not area.
    let filter_speckle = f64::from(options.min_path_area).sqrt().ceil() as usize;
    // A 0.1px tolerance keeps one decimal place in path coordinates.
    let tolerance = options.line_tolerance.min(options.curve_tolerance);
    let path_precision = (-tolerance.log10()).ceil().clamp(0.0, 8.0) as u32;
    let corner_threshold = if options.right_angle_enhance {
        RIGHT_ANGLE_CORNER_THRESHOLD
    } else {
        SMOOTH_CORNER_THRESHOLD
    };
    let hierarchical = if options.color_count <= 2 {
        Hierarchical::Cutout
    } else {
        Hierarchical::Stacked
    };

    Config {
        color_mode: ColorMode::Binary,
        hierarchical,
        mode: PathSimplifyMode::Spline,
        filter_speckle,
        corner_threshold,
        layer_difference: (options.min_color_ratio * 255.0).round() as i32,
        path_precision: Some(path_precision),
        ..Config::default()
    }
}

/// Add `viewBox="0 0 W H"` to the root `<svg>` element.
fn with_viewbox(document: &str, width: u32, height: u32) -> Result<String> {
    if !document.contains("<svg ") {
        return Err(Error::Trace("tracer output has no <svg> root".to_string()));
    }
    Ok(document.replacen(
        "<svg ",
        &format!(r#"<svg viewBox="0 0 {width} {height}" "#),
        1,
    ))
}
