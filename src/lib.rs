//! Extract stamped ink seals from photographed documents.
//!
//! A seal (name or registration stamp) is separated from the paper by a
//! per-pixel color rule, recolored to a single target color on a transparent
//! background, and optionally upscaled and traced to SVG.
//!
//! # Quick Start
//!
//! ```no_run
//! use seal_extract::{ProcessingSettings, SealExtractor};
//!
//! let extractor = SealExtractor::new(ProcessingSettings::default()).expect("valid settings");
//! let img = image::open("scan.jpg").unwrap();
//! let (seal, coverage) = extractor.segment(&img);
//! println!("{:.1}% ink", coverage.ratio() * 100.0);
//! seal.save("seal.png").unwrap();
//! ```
//!
//! # Upscaling and tracing
//!
//! ```no_run
//! use seal_extract::{ProcessOptions, ProcessingSettings, SealExtractor};
//!
//! let extractor = SealExtractor::new(ProcessingSettings::default()).expect("valid settings");
//! let img = image::open("scan.jpg").unwrap();
//! let opts = ProcessOptions { upscale: Some(2.0), vector: true, ..ProcessOptions::default() };
//! let extraction = extractor.extract(&img, &opts).unwrap();
//! std::fs::write("seal.svg", extraction.svg.unwrap()).unwrap();
//! ```
//!
//! Tracing never fails: when the curve-fitting tracer (feature `vtracer`) is
//! missing or errors out, a run-length tracer produces a blocky but complete
//! silhouette instead.

#![deny(missing_docs)]

pub mod advisor;
pub mod classifier;
pub mod color;
mod engine;
pub mod error;
pub mod segment;
pub mod settings;
pub mod trace;
pub mod upscale;

pub use classifier::Classifier;
pub use engine::{
    default_output_path, is_supported_image, save_png, upscaled_output_path, vector_output_path,
    Extraction, ProcessOptions, ProcessResult, SealExtractor,
};
pub use error::{Error, Result};
pub use segment::Coverage;
pub use settings::{DetectionMode, ProcessingSettings};
pub use trace::{Tracer, VectorTracer};
