use image::{DynamicImage, Rgb, Rgba, RgbaImage};
use seal_extract::trace::RunLengthTracer;
use seal_extract::{
    advisor::SealAdvisor, color, DetectionMode, Error, ProcessOptions, ProcessingSettings,
    SealExtractor, Tracer, VectorTracer,
};

/// A 20x20 paper scan with a red ring stamp and some black handwriting.
fn scan() -> DynamicImage {
    let img = RgbaImage::from_fn(20, 20, |x, y| {
        let dx = f64::from(x) - 9.5;
        let dy = f64::from(y) - 9.5;
        let r = (dx * dx + dy * dy).sqrt();
        if (5.0..8.0).contains(&r) {
            Rgba([196, 40, 48, 255])
        } else if y == 18 && x < 10 {
            Rgba([25, 24, 28, 255])
        } else {
            Rgba([242, 238, 228, 255])
        }
    });
    DynamicImage::ImageRgba8(img)
}

struct FailingTracer;

impl Tracer for FailingTracer {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn trace(&self, _image: &RgbaImage) -> seal_extract::Result<String> {
        Err(Error::Trace("simulated crash".to_string()))
    }
}

struct TimeoutAdvisor;

impl SealAdvisor for TimeoutAdvisor {
    fn advise(&self, _png_data_uri: &str, _prompt: &str) -> seal_extract::Result<String> {
        Err(Error::Advisor("request timed out".to_string()))
    }
}

#[test]
fn extractor_initializes_with_defaults() {
    assert!(SealExtractor::new(ProcessingSettings::default()).is_ok());
}

#[test]
fn red_mode_extracts_ring_only() {
    let extractor = SealExtractor::new(ProcessingSettings::default()).unwrap();
    let (seal, coverage) = extractor.segment(&scan());

    assert!(coverage.kept > 0);
    assert_eq!(coverage.total, 400);
    // Ring pixel kept, handwriting and paper dropped.
    assert_eq!(seal.get_pixel(3, 9), &Rgba([217, 0, 0, 255]));
    assert_eq!(seal.get_pixel(2, 18)[3], 0);
    assert_eq!(seal.get_pixel(9, 9)[3], 0);
}

#[test]
fn black_mode_extracts_handwriting_only() {
    let settings = ProcessingSettings {
        detection_mode: DetectionMode::Black,
        target_color: "#000080".to_string(),
        ..ProcessingSettings::default()
    };
    let extractor = SealExtractor::new(settings).unwrap();
    let (seal, coverage) = extractor.segment(&scan());

    assert_eq!(coverage.kept, 10);
    assert_eq!(seal.get_pixel(2, 18), &Rgba([0, 0, 128, 255]));
    assert_eq!(seal.get_pixel(3, 9)[3], 0);
}

#[test]
fn alpha_is_binary_and_color_is_exact() {
    let settings = ProcessingSettings {
        target_color: "#2E8B57".to_string(),
        ..ProcessingSettings::default()
    };
    let extractor = SealExtractor::new(settings).unwrap();
    let (seal, _) = extractor.segment(&scan());

    for px in seal.pixels() {
        match px[3] {
            0 => {}
            255 => assert_eq!(px.0[..3], [0x2e, 0x8b, 0x57]),
            a => panic!("unexpected alpha {a}"),
        }
    }
}

#[test]
fn bad_target_color_recolors_with_default() {
    let settings = ProcessingSettings {
        target_color: "bad-input".to_string(),
        ..ProcessingSettings::default()
    };
    let extractor = SealExtractor::new(settings).unwrap();
    let (seal, _) = extractor.segment(&scan());
    let kept = seal.pixels().find(|px| px[3] == 255).unwrap();
    assert_eq!(Rgb([kept[0], kept[1], kept[2]]), color::DEFAULT_TARGET_COLOR);
}

#[test]
fn resegmenting_output_is_identical() {
    let extractor = SealExtractor::new(ProcessingSettings::default()).unwrap();
    let (once, _) = extractor.segment(&scan());
    let (twice, _) = extractor.segment(&DynamicImage::ImageRgba8(once.clone()));
    assert_eq!(once.as_raw(), twice.as_raw());
}

#[test]
fn mixed_mode_is_rejected_up_front() {
    let settings = ProcessingSettings {
        detection_mode: DetectionMode::Mixed,
        ..ProcessingSettings::default()
    };
    assert!(SealExtractor::new(settings).is_err());
}

#[test]
fn full_pipeline_with_fallback_tracer() {
    let extractor = SealExtractor::new(ProcessingSettings::default())
        .unwrap()
        .with_tracer(VectorTracer::with_primary(FailingTracer));
    let opts = ProcessOptions {
        upscale: Some(2.0),
        vector: true,
        ..ProcessOptions::default()
    };
    let extraction = extractor.extract(&scan(), &opts).unwrap();

    let upscaled = extraction.upscaled.unwrap();
    assert_eq!(upscaled.dimensions(), (40, 40));

    let svg = extraction.svg.unwrap();
    assert_eq!(svg, RunLengthTracer.render(&upscaled));
    assert!(svg.contains(r#"viewBox="0 0 40 40""#));
    assert_eq!(svg.matches("<path").count(), 1);
}

#[test]
fn fallback_trace_of_top_row() {
    let mut img = RgbaImage::new(3, 3);
    for x in 0..3 {
        img.put_pixel(x, 0, Rgba([217, 0, 0, 255]));
    }
    let svg = VectorTracer::fallback_only().trace(&img);
    assert!(svg.contains("M0,0h3v1h-3z"));
    assert!(svg.contains(r#"viewBox="0 0 3 3""#));
}

#[test]
fn advisor_failure_does_not_affect_results() {
    let plain = SealExtractor::new(ProcessingSettings::default()).unwrap();
    let advised = SealExtractor::new(ProcessingSettings::default())
        .unwrap()
        .with_advisor(TimeoutAdvisor);

    let (seal, _) = advised.segment(&scan());
    assert!(advised.advise(&seal).is_none());
    assert_eq!(seal, plain.segment(&scan()).0);
}

#[test]
fn process_file_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scan.png");
    scan().save(&input).unwrap();

    let extractor = SealExtractor::new(ProcessingSettings::default())
        .unwrap()
        .with_tracer(VectorTracer::fallback_only());
    let opts = ProcessOptions {
        upscale: Some(2.0),
        vector: true,
        ..ProcessOptions::default()
    };
    let output = dir.path().join("out").join("scan_seal.png");
    let result = extractor.process_file(&input, &output, &opts);

    assert!(result.success, "{}", result.message);
    assert_eq!(result.outputs.len(), 3);
    assert!(result.coverage > 0.0);

    let seal = image::open(&output).unwrap().to_rgba8();
    assert_eq!(seal.dimensions(), (20, 20));
    let upscaled = image::open(dir.path().join("out/scan_seal@2x.png")).unwrap();
    assert_eq!((upscaled.width(), upscaled.height()), (40, 40));
    let svg = std::fs::read_to_string(dir.path().join("out/scan_seal.svg")).unwrap();
    assert!(svg.contains("<path"));
}

#[test]
fn process_file_reports_unreadable_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.png");
    let extractor = SealExtractor::new(ProcessingSettings::default()).unwrap();
    let result = extractor.process_file(
        &input,
        &dir.path().join("missing_seal.png"),
        &ProcessOptions::default(),
    );
    assert!(!result.success);
    assert!(result.message.starts_with("Failed to load"));
}

#[test]
fn process_directory_handles_each_supported_image() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("in");
    std::fs::create_dir(&input_dir).unwrap();
    scan().save(input_dir.join("a.png")).unwrap();
    scan().to_rgb8().save(input_dir.join("b.bmp")).unwrap();
    std::fs::write(input_dir.join("notes.txt"), "not an image").unwrap();

    let extractor = SealExtractor::new(ProcessingSettings::default()).unwrap();
    let output_dir = dir.path().join("out");
    let results = extractor.process_directory(&input_dir, &output_dir, &ProcessOptions::default());

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.success));
    assert!(output_dir.join("a_seal.png").exists());
    assert!(output_dir.join("b_seal.png").exists());
}

#[test]
fn settings_file_drives_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r##"{"detectionMode": "black", "targetColor": "#101010", "lightnessThreshold": 200}"##,
    )
    .unwrap();

    let settings = ProcessingSettings::load(&path).unwrap();
    let extractor = SealExtractor::new(settings).unwrap();
    let (seal, coverage) = extractor.segment(&scan());
    assert_eq!(coverage.kept, 10);
    assert_eq!(seal.get_pixel(0, 18), &Rgba([16, 16, 16, 255]));
}

#[test]
fn default_tracer_always_returns_a_document() {
    let extractor = SealExtractor::new(ProcessingSettings::default()).unwrap();
    let (seal, _) = extractor.segment(&scan());
    let svg = VectorTracer::new().trace(&seal);
    assert!(svg.contains("<svg"), "{svg}");
    assert!(svg.contains(r#"viewBox="0 0 20 20""#), "{svg}");
    assert!(svg.trim_end().ends_with("</svg>"), "{svg}");
}
