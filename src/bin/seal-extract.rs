use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seal_extract::{
    default_output_path, DetectionMode, ProcessOptions, ProcessResult, ProcessingSettings,
    SealExtractor,
};

#[derive(Parser)]
#[command(
    name = "seal-extract",
    about = "Extract a stamped seal from a document photo into a transparent, recolored PNG",
    version,
    after_help = "Simple usage: seal-extract <image>  (writes <name>_seal.png next to it)\n\n\
                  Settings precedence: defaults < --settings file < individual flags."
)]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Output file or directory (default: {name}_seal.png)
    #[arg(short, long)]
    output: Option<String>,

    /// JSON settings file (camelCase keys, e.g. "redSensitivity")
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Ink detection mode: red or black
    #[arg(short, long)]
    mode: Option<DetectionMode>,

    /// Classification strictness (0-100)
    #[arg(long)]
    sensitivity: Option<u8>,

    /// Lightness threshold (0-255)
    #[arg(long)]
    lightness: Option<u8>,

    /// Minimum red-over-green/blue margin in red mode
    #[arg(long)]
    chroma: Option<u8>,

    /// Edge softness (0-10, currently no effect)
    #[arg(long)]
    edge_softness: Option<u8>,

    /// Recolor target as #rrggbb
    #[arg(short, long)]
    color: Option<String>,

    /// Also write a copy upscaled by this factor (e.g. 2)
    #[arg(short, long)]
    upscale: Option<f32>,

    /// Also write an SVG trace
    #[arg(long)]
    svg: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn processing_settings(&self) -> seal_extract::Result<ProcessingSettings> {
        let mut settings = match &self.settings {
            Some(path) => ProcessingSettings::load(path)?,
            None => ProcessingSettings::default(),
        };

        if let Some(mode) = self.mode {
            settings.detection_mode = mode;
        }
        if let Some(sensitivity) = self.sensitivity {
            settings.red_sensitivity = sensitivity;
        }
        if let Some(lightness) = self.lightness {
            settings.lightness_threshold = lightness;
        }
        if let Some(chroma) = self.chroma {
            settings.chroma_threshold = chroma;
        }
        if let Some(edge_softness) = self.edge_softness {
            settings.edge_softness = edge_softness;
        }
        if let Some(color) = &self.color {
            settings.target_color.clone_from(color);
        }

        Ok(settings)
    }
}

fn init_logging(opts: &ProcessOptions) {
    let default_filter = if opts.quiet {
        "seal_extract=error"
    } else if opts.verbose {
        "seal_extract=info"
    } else {
        "seal_extract=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();

    let opts = ProcessOptions {
        upscale: cli.upscale,
        vector: cli.svg,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };
    init_logging(&opts);

    if let Some(scale) = opts.upscale {
        if !scale.is_finite() || scale <= 0.0 {
            eprintln!("Error: Upscale factor must be a positive number");
            process::exit(1);
        }
    }

    let settings = match cli.processing_settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let extractor = match SealExtractor::new(settings) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Fatal: Failed to initialize extractor: {e}");
            process::exit(1);
        }
    };

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    if !opts.quiet {
        let s = extractor.settings();
        eprintln!(
            "Detecting {} ink (sensitivity {}, lightness {}, chroma {}) -> {}",
            s.detection_mode,
            s.red_sensitivity,
            s.lightness_threshold,
            s.chroma_threshold,
            s.target_color
        );
        eprintln!();
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: seal-extract <input_dir> -o <output_dir>");
            process::exit(1);
        };
        extractor.process_directory(input_path, &output_dir, &opts)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path),
        };
        vec![extractor.process_file(input_path, &output_path, &opts)]
    };

    let mut success_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, &opts);
        if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Extracted: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, opts: &ProcessOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        eprintln!("[OK] {filename} ({:.1}% ink)", result.coverage * 100.0);
        if result.coverage <= 0.0 {
            eprintln!("  -> no ink detected; check --mode and the thresholds");
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose {
        for output in &result.outputs {
            eprintln!("  -> {}", output.display());
        }
    }
}
