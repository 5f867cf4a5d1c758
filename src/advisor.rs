//! Optional analysis of an extracted seal by an external text generator.
//!
//! The crate ships no client. Callers that have one implement
//! [`SealAdvisor`] and hand it to the extractor explicitly; every failure on
//! this path is logged and dropped so it can never affect the image results.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, RgbaImage};
use tracing::warn;

use crate::error::Result;

/// Prompt sent along with every seal image.
pub const ADVISORY_PROMPT: &str = "This image is a seal or stamp extracted from a photographed \
document, recolored on a transparent background. Comment briefly on how legible the mark is, \
whether any paper texture or stray marks remain, and which extraction settings (sensitivity, \
lightness or chroma threshold) might improve the result.";

/// A text-generation collaborator that comments on an extracted seal.
pub trait SealAdvisor: Send + Sync {
    /// Return free-form advice for the PNG in `png_data_uri`.
    ///
    /// # Errors
    ///
    /// Implementations should return [`Error::Advisor`](crate::Error::Advisor)
    /// on any failure (missing credentials, timeout, bad response).
    fn advise(&self, png_data_uri: &str, prompt: &str) -> Result<String>;
}

/// Encode `image` as a `data:image/png;base64,...` URI.
///
/// # Errors
///
/// Returns [`Error::Image`](crate::Error::Image) if PNG encoding fails.
pub fn png_data_uri(image: &RgbaImage) -> Result<String> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Ask `advisor` about `image`. Returns `None` on any failure.
#[must_use]
pub fn request_advice(advisor: &dyn SealAdvisor, image: &RgbaImage) -> Option<String> {
    let uri = match png_data_uri(image) {
        Ok(uri) => uri,
        Err(e) => {
            warn!(error = %e, "Could not encode seal for advisor");
            return None;
        }
    };

    match advisor.advise(&uri, ADVISORY_PROMPT) {
        Ok(advice) => Some(advice),
        Err(e) => {
            warn!(error = %e, "Advisor request failed");
            None
        }
    }
}
