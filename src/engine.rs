//! Seal extraction engine.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbaImage};
use tracing::{debug, info};

use crate::advisor::{self, SealAdvisor};
use crate::classifier::Classifier;
use crate::error::Result;
use crate::segment::{self, Coverage};
use crate::settings::ProcessingSettings;
use crate::trace::VectorTracer;
use crate::upscale;

/// Options controlling which outputs are produced.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Also produce a copy upscaled by this factor.
    pub upscale: Option<f32>,
    /// Also produce an SVG trace (of the upscaled copy when there is one).
    pub vector: bool,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Everything produced from one source image.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Segmented, recolored seal at source resolution.
    pub seal: RgbaImage,
    /// Upscaled seal, if requested.
    pub upscaled: Option<RgbaImage>,
    /// SVG trace, if requested.
    pub svg: Option<String>,
    /// Ink pixel counts from segmentation.
    pub coverage: Coverage,
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Files written, in the order they were saved.
    pub outputs: Vec<PathBuf>,
    /// Fraction of pixels classified as ink.
    pub coverage: f32,
    /// Human-readable status message.
    pub message: String,
}

impl ProcessResult {
    fn failed(path: &Path, message: String) -> Self {
        Self {
            path: path.to_path_buf(),
            success: false,
            outputs: Vec::new(),
            coverage: 0.0,
            message,
        }
    }
}

/// The seal extractor holding validated settings and the tracer.
///
/// Create once with [`SealExtractor::new()`] and reuse for multiple images.
/// Each call works on its own buffers, so one extractor can serve several
/// threads.
pub struct SealExtractor {
    settings: ProcessingSettings,
    classifier: Classifier,
    target: Rgb<u8>,
    tracer: VectorTracer,
    advisor: Option<Box<dyn SealAdvisor>>,
}

impl SealExtractor {
    /// Create an extractor for `settings`, clamped to their declared ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDetectionMode`](crate::Error::UnsupportedDetectionMode)
    /// if the settings select a mode without a classifier.
    pub fn new(settings: ProcessingSettings) -> Result<Self> {
        let settings = settings.clamped();
        let classifier = Classifier::new(&settings)?;
        let target = settings.target_rgb();
        debug!(?classifier, ?target, "Seal extractor ready");

        Ok(Self {
            settings,
            classifier,
            target,
            tracer: VectorTracer::new(),
            advisor: None,
        })
    }

    /// Replace the vector tracer.
    #[must_use]
    pub fn with_tracer(mut self, tracer: VectorTracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Attach an optional analysis collaborator.
    #[must_use]
    pub fn with_advisor(mut self, advisor: impl SealAdvisor + 'static) -> Self {
        self.advisor = Some(Box::new(advisor));
        self
    }

    /// The clamped settings in use.
    #[must_use]
    pub fn settings(&self) -> &ProcessingSettings {
        &self.settings
    }

    /// Segment and recolor `image` without touching it.
    #[must_use]
    pub fn segment(&self, image: &DynamicImage) -> (RgbaImage, Coverage) {
        let mut seal = image.to_rgba8();
        let coverage = segment::apply(&mut seal, &self.classifier, self.target);
        (seal, coverage)
    }

    /// Trace `image` into an SVG document. Never fails.
    #[must_use]
    pub fn trace(&self, image: &RgbaImage) -> String {
        self.tracer.trace(image)
    }

    /// Run the full pipeline on one decoded image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScale`](crate::Error::InvalidScale) if
    /// `opts.upscale` is not a positive, finite factor.
    pub fn extract(&self, image: &DynamicImage, opts: &ProcessOptions) -> Result<Extraction> {
        let (seal, coverage) = self.segment(image);

        let upscaled = opts
            .upscale
            .map(|scale| upscale::upscale(&seal, scale))
            .transpose()?;

        let svg = opts
            .vector
            .then(|| self.trace(upscaled.as_ref().unwrap_or(&seal)));

        Ok(Extraction {
            seal,
            upscaled,
            svg,
            coverage,
        })
    }

    /// Ask the attached advisor (if any) to comment on `seal`.
    ///
    /// Best effort: returns `None` without an advisor or on any failure.
    #[must_use]
    pub fn advise(&self, seal: &RgbaImage) -> Option<String> {
        let advisor = self.advisor.as_deref()?;
        advisor::request_advice(advisor, seal)
    }

    /// Process a single image file: load, extract, save.
    ///
    /// `output` is the PNG path for the seal. The upscaled copy and the SVG
    /// are written next to it (see [`upscaled_output_path`] and
    /// [`vector_output_path`]).
    #[must_use]
    pub fn process_file(
        &self,
        input: &Path,
        output: &Path,
        opts: &ProcessOptions,
    ) -> ProcessResult {
        let image = match image::open(input) {
            Ok(img) => img,
            Err(e) => return ProcessResult::failed(input, format!("Failed to load: {e}")),
        };

        let extraction = match self.extract(&image, opts) {
            Ok(extraction) => extraction,
            Err(e) => return ProcessResult::failed(input, format!("Failed to extract: {e}")),
        };

        let mut result = ProcessResult {
            path: input.to_path_buf(),
            success: false,
            outputs: Vec::new(),
            coverage: extraction.coverage.ratio(),
            message: String::new(),
        };

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    return result;
                }
            }
        }

        if let Err(e) = save_png(&extraction.seal, output) {
            result.message = format!("Failed to save: {e}");
            return result;
        }
        result.outputs.push(output.to_path_buf());

        if let (Some(upscaled), Some(scale)) = (&extraction.upscaled, opts.upscale) {
            let path = upscaled_output_path(output, scale);
            if let Err(e) = save_png(upscaled, &path) {
                result.message = format!("Failed to save upscaled copy: {e}");
                return result;
            }
            result.outputs.push(path);
        }

        if let Some(svg) = &extraction.svg {
            let path = vector_output_path(output);
            if let Err(e) = std::fs::write(&path, svg) {
                result.message = format!("Failed to save SVG: {e}");
                return result;
            }
            result.outputs.push(path);
        }

        info!(
            input = %input.display(),
            outputs = result.outputs.len(),
            coverage = result.coverage,
            "Seal extracted"
        );
        result.success = true;
        result.message = "Seal extracted".to_string();
        result
    }

    /// Process all supported images in a directory.
    ///
    /// Uses parallel iteration when the `cli` feature is enabled (via rayon).
    /// Returns a [`ProcessResult`] for each image found.
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> Vec<ProcessResult> {
        let entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => {
                return vec![ProcessResult::failed(
                    input_dir,
                    format!("Failed to read directory: {e}"),
                )];
            }
        };

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult::failed(
                    output_dir,
                    format!("Failed to create output directory: {e}"),
                )];
            }
        }

        let process_one = |input_path: &PathBuf| {
            let output_path = output_dir.join(seal_file_name(input_path));
            self.process_file(input_path, &output_path, opts)
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            entries.par_iter().map(process_one).collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            entries.iter().map(process_one).collect()
        }
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Save an RGBA image as PNG regardless of the path's extension.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

fn seal_file_name(input: &Path) -> String {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    format!("{stem}_seal.png")
}

/// Generate a default output path from an input path.
///
/// Example: `"scan.jpg"` becomes `"scan_seal.png"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(seal_file_name(input))
}

/// Path of the upscaled copy next to `output`.
///
/// Example: `"scan_seal.png"` at scale 2 becomes `"scan_seal@2x.png"`.
#[must_use]
pub fn upscaled_output_path(output: &Path, scale: f32) -> PathBuf {
    let stem = output.file_stem().unwrap_or_default().to_string_lossy();
    output.with_file_name(format!("{stem}@{scale}x.png"))
}

/// Path of the SVG trace next to `output`.
#[must_use]
pub fn vector_output_path(output: &Path) -> PathBuf {
    output.with_extension("svg")
}
