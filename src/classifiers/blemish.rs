use tracing::debug;

use super::rules::RuleTable;
use super::{Attribute, BlemishSeverity, Classification, Classifier, Label};
use crate::core_modules::binary_mask::BinaryMask;
use crate::core_modules::blob_detector::blob_detector::{self, Connectivity};
use crate::core_modules::color_space;
use crate::core_modules::filters::{self, Polarity};
use crate::core_modules::pixel_buffer::PixelBuffer;

pub const BLUR_KERNEL: usize = 5;
/// Smoothed gray pixels strictly below this level are blemish candidates.
pub const DARK_LEVEL: u8 = 120;

/// Dark spots: smoothed gray pixels below [`DARK_LEVEL`].
pub fn blemish_mask(buffer: &PixelBuffer) -> BinaryMask {
    let gray = color_space::to_grayscale(buffer);
    let smoothed = filters::gaussian_blur(&gray, BLUR_KERNEL, 0.0);
    filters::threshold(&smoothed, DARK_LEVEL, Polarity::Dark)
}

/// Number of 8-connected dark regions.
pub fn blemish_count(buffer: &PixelBuffer) -> usize {
    blob_detector::find_blobs(&blemish_mask(buffer), Connectivity::Eight).count()
}

/// Counts dark spots. Every spot counts once regardless of size, so one region
/// covering the whole image is a single (mild) blemish.
pub struct BlemishClassifier {
    rules: RuleTable<usize, BlemishSeverity>,
}

impl Default for BlemishClassifier {
    fn default() -> Self {
        Self {
            rules: RuleTable::new(BlemishSeverity::None)
                .rule(|count: &usize| *count > 20, BlemishSeverity::Severe)
                .rule(|count: &usize| *count > 10, BlemishSeverity::Moderate)
                .rule(|count: &usize| *count > 0, BlemishSeverity::Mild),
        }
    }
}

impl BlemishClassifier {
    pub fn label_for(&self, count: usize) -> BlemishSeverity {
        self.rules.evaluate(&count)
    }
}

impl Classifier for BlemishClassifier {
    fn attribute(&self) -> Attribute {
        Attribute::Pimples
    }

    fn classify(&self, buffer: &PixelBuffer) -> Classification {
        let count = blemish_count(buffer);
        let pimples = self.label_for(count);
        debug!(count, label = %pimples, "blemishes");
        Classification {
            label: Label::Pimples(pimples),
            statistic: count as f64,
        }
    }
}
