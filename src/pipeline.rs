// THEORY:
// The `pipeline` module is the top-level, synchronous API of the analysis engine:
// the Analysis Orchestrator. It turns one image path into one `SkinReport`.
//
// Key architectural principles:
// 1.  **Load Once**: The image is read and decoded exactly once. Every classifier
//     sees the same immutable `PixelBuffer`.
// 2.  **All or Nothing**: A structural failure (missing or undecodable image) is
//     returned as an error before any classifier runs. A report always carries
//     all five labels; there are no partial results.
// 3.  **Uniform Classifiers**: The orchestrator only knows the `Classifier`
//     abstraction. It runs the list and assembles the labels by attribute.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classifiers::{
    self, Attribute, BlemishSeverity, Classification, Classifier, Label, Oiliness, Severity,
    SkinTone,
};
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::{AnalysisError, Result};

/// Configuration for the pipelines.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of concurrent analysis workers in the parallel pipeline.
    pub worker_count: usize,
    /// Run the classifiers of a single image on separate blocking threads.
    pub parallel_classifiers: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get().max(1),
            parallel_classifiers: true,
        }
    }
}

/// The five labels of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinReport {
    pub skin_tone: SkinTone,
    pub oiliness: Oiliness,
    pub redness: Severity,
    pub pimples: BlemishSeverity,
    pub open_pores: Severity,
}

impl SkinReport {
    /// Assembles a report from classifier outputs in any order. Every attribute
    /// must be present; when one appears twice the last one wins.
    pub fn from_classifications(classifications: &[Classification]) -> Result<Self> {
        let mut skin_tone = None;
        let mut oiliness = None;
        let mut redness = None;
        let mut pimples = None;
        let mut open_pores = None;

        for classification in classifications {
            match classification.label {
                Label::SkinTone(label) => skin_tone = Some(label),
                Label::Oiliness(label) => oiliness = Some(label),
                Label::Redness(label) => redness = Some(label),
                Label::Pimples(label) => pimples = Some(label),
                Label::OpenPores(label) => open_pores = Some(label),
            }
        }

        Ok(Self {
            skin_tone: skin_tone.ok_or(AnalysisError::MissingAttribute(Attribute::SkinTone))?,
            oiliness: oiliness.ok_or(AnalysisError::MissingAttribute(Attribute::Oiliness))?,
            redness: redness.ok_or(AnalysisError::MissingAttribute(Attribute::Redness))?,
            pimples: pimples.ok_or(AnalysisError::MissingAttribute(Attribute::Pimples))?,
            open_pores: open_pores.ok_or(AnalysisError::MissingAttribute(Attribute::OpenPores))?,
        })
    }

    pub fn label(&self, attribute: Attribute) -> Label {
        match attribute {
            Attribute::SkinTone => Label::SkinTone(self.skin_tone),
            Attribute::Oiliness => Label::Oiliness(self.oiliness),
            Attribute::Redness => Label::Redness(self.redness),
            Attribute::Pimples => Label::Pimples(self.pimples),
            Attribute::OpenPores => Label::OpenPores(self.open_pores),
        }
    }
}

impl fmt::Display for SkinReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attribute) in Attribute::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", self.label(*attribute))?;
        }
        Ok(())
    }
}

/// The wire shape of one request: the five-key mapping or `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Report(SkinReport),
    Error { error: String },
}

impl From<Result<SkinReport>> for AnalysisOutcome {
    fn from(result: Result<SkinReport>) -> Self {
        match result {
            Ok(report) => AnalysisOutcome::Report(report),
            Err(error) => AnalysisOutcome::Error {
                error: error.client_message(),
            },
        }
    }
}

/// The synchronous orchestrator.
pub struct AnalysisPipeline {
    classifiers: Vec<Arc<dyn Classifier>>,
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new(classifiers::standard_classifiers())
    }
}

impl AnalysisPipeline {
    pub fn new(classifiers: Vec<Arc<dyn Classifier>>) -> Self {
        Self { classifiers }
    }

    /// Loads the image at `path` and labels it.
    pub fn analyze(&self, path: impl AsRef<Path>) -> Result<SkinReport> {
        let path = path.as_ref();
        let buffer = PixelBuffer::load(path).inspect_err(|error| {
            warn!(path = %path.display(), %error, "image rejected");
        })?;
        let report = self.analyze_buffer(&buffer)?;
        info!(path = %path.display(), %report, "analysis complete");
        Ok(report)
    }

    /// Labels an image that is already in memory.
    pub fn analyze_buffer(&self, buffer: &PixelBuffer) -> Result<SkinReport> {
        let classifications: Vec<Classification> = self
            .classifiers
            .iter()
            .map(|classifier| classifier.classify(buffer))
            .collect();
        SkinReport::from_classifications(&classifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn uniform(value: u8) -> PixelBuffer {
        PixelBuffer::from_rgb(RgbImage::from_pixel(16, 16, Rgb([value; 3])))
    }

    #[test]
    fn uniform_white_face() {
        let report = AnalysisPipeline::default().analyze_buffer(&uniform(255)).unwrap();
        assert_eq!(report.oiliness, Oiliness::Oily);
        assert_eq!(report.open_pores, Severity::Low);
        assert_eq!(report.redness, Severity::Low);
        assert_eq!(report.pimples, BlemishSeverity::None);
    }

    #[test]
    fn uniform_black_face() {
        let report = AnalysisPipeline::default().analyze_buffer(&uniform(0)).unwrap();
        assert_eq!(report.oiliness, Oiliness::Dry);
        assert_eq!(report.pimples, BlemishSeverity::Mild);
        assert_eq!(report.skin_tone, SkinTone::Dark);
    }

    #[test]
    fn missing_classifier_is_an_error() {
        let mut partial = classifiers::standard_classifiers();
        partial.pop();
        let error = AnalysisPipeline::new(partial).analyze_buffer(&uniform(128)).unwrap_err();
        assert!(matches!(error, AnalysisError::MissingAttribute(Attribute::OpenPores)));
        assert!(!error.is_structural());
    }

    #[test]
    fn report_serializes_with_exactly_five_keys() {
        let report = AnalysisPipeline::default().analyze_buffer(&uniform(255)).unwrap();
        let value = serde_json::to_value(report).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["oiliness", "openPores", "pimples", "redness", "skinTone"]);
        assert_eq!(object["pimples"], "None");
    }

    #[test]
    fn outcome_shapes_are_exclusive() {
        let error: AnalysisOutcome = Err(AnalysisError::NotFound {
            path: "/nope.jpg".into(),
        })
        .into();
        assert_eq!(
            serde_json::to_string(&error).unwrap(),
            r#"{"error":"Image file not found"}"#
        );

        let report = AnalysisPipeline::default().analyze_buffer(&uniform(0)).unwrap();
        let json = serde_json::to_value(AnalysisOutcome::from(Ok(report))).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["oiliness"], "Dry");
    }

    #[test]
    fn display_lists_attributes_in_order() {
        let report = AnalysisPipeline::default().analyze_buffer(&uniform(0)).unwrap();
        assert_eq!(
            report.to_string(),
            "skinTone=Dark oiliness=Dry redness=Low pimples=Mild openPores=Low"
        );
    }
}
