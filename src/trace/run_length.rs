//! Deterministic run-length tracer.

use std::fmt::Write;

use image::RgbaImage;
use svg::node::element::Path;
use svg::Document;

use super::Tracer;
use crate::error::Result;

/// Pixels with alpha strictly above this count as ink.
pub const ALPHA_CUTOFF: u8 = 128;

/// Emits one `1px`-tall rectangle per horizontal run of opaque pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunLengthTracer;

impl RunLengthTracer {
    /// Render `image` as an SVG document with a single `currentColor` path.
    ///
    /// The root element carries `width`, `height` and `viewBox="0 0 W H"`.
    /// A zero-area image produces a document with no path.
    #[must_use]
    pub fn render(&self, image: &RgbaImage) -> String {
        let (width, height) = image.dimensions();
        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height));

        if width > 0 && height > 0 {
            let path = Path::new()
                .set("d", path_data(image))
                .set("fill", "currentColor");
            document = document.add(path);
        }

        document.to_string()
    }
}

impl Tracer for RunLengthTracer {
    fn name(&self) -> &'static str {
        "run-length"
    }

    fn trace(&self, image: &RgbaImage) -> Result<String> {
        Ok(self.render(image))
    }
}

/// Path data covering every opaque run, row by row, left to right.
///
/// Each run starting at `(x, y)` with length `n` becomes `Mx,yhnv1h-nz`.
#[must_use]
pub fn path_data(image: &RgbaImage) -> String {
    let (width, height) = image.dimensions();
    let mut data = String::new();

    for y in 0..height {
        let mut run_start = None;
        // One step past the edge closes a run touching the right border.
        for x in 0..=width {
            let opaque = x < width && image.get_pixel(x, y)[3] > ALPHA_CUTOFF;
            match (opaque, run_start) {
                (true, None) => run_start = Some(x),
                (false, Some(start)) => {
                    let len = x - start;
                    // Writing to a String cannot fail.
                    let _ = write!(data, "M{start},{y}h{len}v1h-{len}z");
                    run_start = None;
                }
                _ => {}
            }
        }
    }

    data
}
