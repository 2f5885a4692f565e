//! End-to-end tests: images on disk through the synchronous and pooled orchestrators.

use std::fs;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use image::{Rgb, RgbImage};
use skin_vision::classifiers::{BlemishSeverity, Oiliness, Severity};
use skin_vision::{AnalysisError, AnalysisOutcome, AnalysisPipeline, AnalysisPool, PipelineConfig};
use tempfile::{TempDir, tempdir};

fn write_png(dir: &TempDir, name: &str, image: &RgbImage) -> PathBuf {
    let path = dir.path().join(name);
    image.save(&path).expect("Failed to write fixture");
    path
}

fn uniform(value: u8) -> RgbImage {
    RgbImage::from_pixel(32, 32, Rgb([value; 3]))
}

/// A face-like fixture with some of everything: warm skin, a red patch and dark spots.
fn blotchy_face() -> RgbImage {
    RgbImage::from_fn(64, 48, |x, y| {
        if x < 12 && y < 12 {
            Rgb([220, 30, 30])
        } else if x % 16 == 8 && y % 16 == 8 {
            Rgb([20, 15, 10])
        } else {
            Rgb([225, 190, 160])
        }
    })
}

fn outcome_json(path: &Path) -> serde_json::Value {
    let outcome = AnalysisOutcome::from(AnalysisPipeline::default().analyze(path));
    serde_json::to_value(outcome).unwrap()
}

#[test]
fn missing_file_reports_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.jpg");
    let error = AnalysisPipeline::default().analyze(&path).unwrap_err();
    assert!(matches!(error, AnalysisError::NotFound { .. }));
    assert!(error.is_structural());
    assert_eq!(error.path(), Some(path.as_path()));
    assert_eq!(outcome_json(&path), serde_json::json!({ "error": "Image file not found" }));
}

#[test]
fn text_renamed_to_jpg_reports_invalid_image() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("face.jpg");
    fs::write(&path, "this is not an image").unwrap();
    assert_eq!(outcome_json(&path), serde_json::json!({ "error": "Invalid image" }));
}

#[test]
fn zero_byte_file_reports_invalid_image() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("face.png");
    fs::write(&path, b"").unwrap();
    assert_eq!(outcome_json(&path), serde_json::json!({ "error": "Invalid image" }));
}

#[test]
fn uniform_white_png() {
    let dir = tempdir().unwrap();
    let path = write_png(&dir, "white.png", &uniform(255));
    let report = AnalysisPipeline::default().analyze(&path).unwrap();
    assert_eq!(report.oiliness, Oiliness::Oily);
    assert_eq!(report.open_pores, Severity::Low);
}

#[test]
fn uniform_black_png() {
    let dir = tempdir().unwrap();
    let path = write_png(&dir, "black.png", &uniform(0));
    let report = AnalysisPipeline::default().analyze(&path).unwrap();
    assert_eq!(report.oiliness, Oiliness::Dry);
    assert_eq!(report.pimples, BlemishSeverity::Mild);
}

#[test]
fn success_outcome_has_exactly_the_five_keys() {
    let dir = tempdir().unwrap();
    let path = write_png(&dir, "face.png", &blotchy_face());
    let json = outcome_json(&path);
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 5);
    for key in ["skinTone", "oiliness", "redness", "pimples", "openPores"] {
        assert!(object[key].is_string(), "missing {key}");
    }
}

#[test]
fn analysis_is_deterministic() {
    let dir = tempdir().unwrap();
    let path = write_png(&dir, "face.png", &blotchy_face());
    let pipeline = AnalysisPipeline::default();
    let first = pipeline.analyze(&path).unwrap();
    let second = pipeline.analyze(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn jpeg_decodes_like_any_other_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("white.jpg");
    uniform(255).save(&path).unwrap();
    let report = AnalysisPipeline::default().analyze(&path).unwrap();
    assert_eq!(report.oiliness, Oiliness::Oily);
}

#[tokio::test]
async fn pool_agrees_with_sequential_pipeline_on_disk() {
    let dir = tempdir().unwrap();
    let paths = vec![
        write_png(&dir, "face.png", &blotchy_face()),
        write_png(&dir, "white.png", &uniform(255)),
        dir.path().join("missing.png"),
        write_png(&dir, "black.png", &uniform(0)),
    ];

    let pool = AnalysisPool::new(PipelineConfig {
        worker_count: 2,
        parallel_classifiers: true,
    });
    let pooled = join_all(paths.iter().map(|path| pool.analyze(path))).await;
    pool.shutdown().await;

    let sequential = AnalysisPipeline::default();
    for (path, pooled) in paths.iter().zip(pooled) {
        let expected = AnalysisOutcome::from(sequential.analyze(path));
        assert_eq!(AnalysisOutcome::from(pooled), expected, "{}", path.display());
    }
}
