//! End-to-end conversions with the sfnt engine.

use std::{fs, path::Path};

use fontgen_core::{
    Configuration, JobOutcome, LogReporter, Modifiers, NoPrompt, Payload, SfntEngine,
    SubsetCategory, TargetFormat, run_job,
};
use fontgen_font_ops::{NewGlyph, TrueTypeBuilder, outline::quadratic_glyph};
use kurbo::{Rect, Shape};
use read_fonts::{FontRef, TableProvider};
use tempfile::TempDir;

fn sample_font() -> Vec<u8> {
    let mut builder = TrueTypeBuilder::new("Sample", 1000).metrics(800, -200);
    let bar = |x: f64| quadratic_glyph(&Rect::new(x, 0.0, x + 120.0, 700.0).to_path(0.1)).unwrap();
    builder.add_glyph(NewGlyph::new(bar(50.0), 500));
    builder.add_glyph(NewGlyph::new(None, 250).with_codepoints([' ']));
    for (i, ch) in "AaBb09!".chars().enumerate() {
        builder.add_glyph(NewGlyph::new(bar(40.0 + i as f64 * 10.0), 600).with_codepoints([ch]));
    }
    builder.build().unwrap()
}

fn convert(input: &Path, options: Configuration) -> Vec<std::path::PathBuf> {
    let payload = Payload::new(input, options);
    match run_job(payload, Modifiers::default(), &NoPrompt, &SfntEngine, &LogReporter).unwrap() {
        JobOutcome::Completed(outputs) => outputs.into_iter().map(|o| o.path).collect(),
        JobOutcome::Aborted => panic!("job aborted"),
    }
}

#[test]
fn test_ttf_to_every_format_and_back() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("Sample.ttf");
    fs::write(&input, sample_font()).unwrap();

    let web = Configuration {
        destination: "web".into(),
        ..Configuration::default().with_formats([
            TargetFormat::Woff,
            TargetFormat::Woff2,
            TargetFormat::Eot,
            TargetFormat::Svg,
        ])
    };
    let outputs = convert(&input, web);
    assert_eq!(outputs.len(), 4);

    for output in &outputs {
        let back = Configuration { destination: "back".into(), ..Configuration::default() }
            .with_formats([TargetFormat::Ttf]);
        let restored = convert(output, back);
        let data = fs::read(&restored[0]).unwrap();
        let font = FontRef::new(&data).unwrap();
        let cmap = font.cmap().unwrap();
        for ch in "AaBb09! ".chars() {
            assert!(cmap.map_codepoint(ch).is_some(), "{} lost {ch:?}", output.display());
        }
    }
}

#[test]
fn test_subset_and_hinting_options() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("Sample.otf");
    fs::write(&input, sample_font()).unwrap();

    let options = Configuration {
        destination: "out".into(),
        hinting: false,
        ..Configuration::default()
            .with_formats([TargetFormat::Ttf])
            .with_subsets([SubsetCategory::UpperCase])
    };
    let outputs = convert(&input, options);
    assert_eq!(outputs, [dir.path().join("out/Sample.ttf")]);

    let data = fs::read(&outputs[0]).unwrap();
    let font = FontRef::new(&data).unwrap();
    let cmap = font.cmap().unwrap();
    assert!(cmap.map_codepoint('A').is_some());
    assert!(cmap.map_codepoint(' ').is_some());
    assert!(cmap.map_codepoint('a').is_none());
    assert!(cmap.map_codepoint('0').is_none());
}
