//! Bitmap-to-SVG tracing with a guaranteed fallback.
//!
//! A [`Tracer`] turns a segmented RGBA buffer (transparent background,
//! uniform ink color) into an SVG document. Two implementations exist:
//!
//! - [`SplineTracer`] (feature `vtracer`): curve-fitted outlines from the
//!   `vtracer` library, suited to ink blots.
//! - [`RunLengthTracer`]: one rectangle per horizontal run of opaque pixels.
//!   Blocky, but infallible.
//!
//! [`VectorTracer`] tries the primary tracer when one is configured and
//! falls back to the run-length tracer on any error, so callers always get
//! a document back.

mod run_length;
#[cfg(feature = "vtracer")]
mod spline;

use image::RgbaImage;
use tracing::warn;

use crate::error::Result;

pub use run_length::{path_data, RunLengthTracer, ALPHA_CUTOFF};
#[cfg(feature = "vtracer")]
pub use spline::SplineTracer;

/// MIME type for persisted trace output.
pub const SVG_MIME_TYPE: &str = "image/svg+xml";

/// Converts a pixel buffer into an SVG document string.
pub trait Tracer: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Trace `image` into a complete SVG document.
    ///
    /// # Errors
    ///
    /// Implementations return [`Error::Trace`](crate::Error::Trace) when they
    /// cannot produce a document for this image.
    fn trace(&self, image: &RgbaImage) -> Result<String>;
}

/// Fixed configuration of the curve-fitting tracer.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceOptions {
    /// Straight-line fitting tolerance, in pixels.
    pub line_tolerance: f64,
    /// Curve fitting tolerance, in pixels.
    pub curve_tolerance: f64,
    /// Shapes smaller than this area (square pixels) are dropped as noise.
    pub min_path_area: u32,
    /// Keep right-angle corners sharp instead of rounding them.
    pub right_angle_enhance: bool,
    /// Number of quantized colors (background and ink).
    pub color_count: u8,
    /// Minimum share of the image a color needs to get its own layer.
    pub min_color_ratio: f64,
    /// Emit a `viewBox` on the root element.
    pub emit_viewbox: bool,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            line_tolerance: 0.1,
            curve_tolerance: 0.1,
            min_path_area: 32,
            right_angle_enhance: true,
            color_count: 2,
            min_color_ratio: 0.05,
            emit_viewbox: true,
        }
    }
}

/// Primary tracer with a run-length fallback.
pub struct VectorTracer {
    primary: Option<Box<dyn Tracer>>,
    fallback: RunLengthTracer,
}

impl VectorTracer {
    /// Use the library-backed tracer when the crate was built with it, and the
    /// run-length tracer otherwise.
    #[must_use]
    pub fn new() -> Self {
        Self {
            primary: default_primary(),
            fallback: RunLengthTracer,
        }
    }

    /// Always use the run-length tracer.
    #[must_use]
    pub fn fallback_only() -> Self {
        Self {
            primary: None,
            fallback: RunLengthTracer,
        }
    }

    /// Use `primary` first, falling back to the run-length tracer.
    #[must_use]
    pub fn with_primary(primary: impl Tracer + 'static) -> Self {
        Self {
            primary: Some(Box::new(primary)),
            fallback: RunLengthTracer,
        }
    }

    /// Name of the configured primary tracer, if any.
    #[must_use]
    pub fn primary_name(&self) -> Option<&'static str> {
        self.primary.as_ref().map(|tracer| tracer.name())
    }

    /// Trace `image` into an SVG document. Never fails.
    #[must_use]
    pub fn trace(&self, image: &RgbaImage) -> String {
        if let Some(primary) = &self.primary {
            match primary.trace(image) {
                Ok(svg) => return svg,
                Err(e) => warn!(
                    tracer = primary.name(),
                    error = %e,
                    "Primary tracer failed, using run-length fallback"
                ),
            }
        }
        self.fallback.render(image)
    }
}

impl Default for VectorTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VectorTracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorTracer")
            .field("primary", &self.primary_name())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

#[cfg(feature = "vtracer")]
fn default_primary() -> Option<Box<dyn Tracer>> {
    Some(Box::new(SplineTracer::default()))
}

#[cfg(not(feature = "vtracer"))]
fn default_primary() -> Option<Box<dyn Tracer>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use image::Rgba;

    struct BrokenTracer;

    impl Tracer for BrokenTracer {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn trace(&self, _image: &RgbaImage) -> Result<String> {
            Err(Error::Trace("library unavailable".to_string()))
        }
    }

    struct FixedTracer;

    impl Tracer for FixedTracer {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn trace(&self, _image: &RgbaImage) -> Result<String> {
            Ok("<svg/>".to_string())
        }
    }

    fn top_row() -> RgbaImage {
        let mut img = RgbaImage::new(3, 3);
        for x in 0..3 {
            img.put_pixel(x, 0, Rgba([217, 0, 0, 255]));
        }
        img
    }

    #[test]
    fn failing_primary_falls_back_to_run_length() {
        let tracer = VectorTracer::with_primary(BrokenTracer);
        let svg = tracer.trace(&top_row());
        assert!(svg.contains(r#"viewBox="0 0 3 3""#));
        assert!(svg.contains("M0,0h3v1h-3z"));
        assert_eq!(svg, RunLengthTracer.render(&top_row()));
    }

    #[test]
    fn successful_primary_output_is_returned() {
        let tracer = VectorTracer::with_primary(FixedTracer);
        assert_eq!(tracer.trace(&top_row()), "<svg/>");
        assert_eq!(tracer.primary_name(), Some("fixed"));
    }

    #[test]
    fn fallback_only_has_no_primary() {
        let tracer = VectorTracer::fallback_only();
        assert_eq!(tracer.primary_name(), None);
        let svg = tracer.trace(&top_row());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn default_options_match_ink_tracing_profile() {
        let options = TraceOptions::default();
        assert_eq!(options.min_path_area, 32);
        assert_eq!(options.color_count, 2);
        assert!(options.right_angle_enhance);
        assert!(options.emit_viewbox);
    }
}
