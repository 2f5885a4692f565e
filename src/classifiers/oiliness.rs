use tracing::debug;

use super::rules::RuleTable;
use super::{Attribute, Classification, Classifier, Label, Oiliness};
use crate::core_modules::binary_mask::BinaryMask;
use crate::core_modules::color_space;
use crate::core_modules::filters::{self, Polarity};
use crate::core_modules::pixel_buffer::PixelBuffer;

pub const BLUR_KERNEL: usize = 5;
/// Gray level at or above which a smoothed pixel counts as a specular highlight.
pub const HIGHLIGHT_LEVEL: u8 = 200;

/// Specular highlights: smoothed gray pixels at or above [`HIGHLIGHT_LEVEL`].
pub fn highlight_mask(buffer: &PixelBuffer) -> BinaryMask {
    let gray = color_space::to_grayscale(buffer);
    let smoothed = filters::gaussian_blur(&gray, BLUR_KERNEL, 0.0);
    filters::threshold(&smoothed, HIGHLIGHT_LEVEL, Polarity::Bright)
}

/// More than a fifth of the face reflecting highlights reads as oily.
pub struct OilinessClassifier {
    rules: RuleTable<f64, Oiliness>,
}

impl Default for OilinessClassifier {
    fn default() -> Self {
        Self {
            rules: RuleTable::new(Oiliness::Dry).rule(|ratio: &f64| *ratio > 0.2, Oiliness::Oily),
        }
    }
}

impl OilinessClassifier {
    pub fn label_for(&self, highlight_ratio: f64) -> Oiliness {
        self.rules.evaluate(&highlight_ratio)
    }
}

impl Classifier for OilinessClassifier {
    fn attribute(&self) -> Attribute {
        Attribute::Oiliness
    }

    fn classify(&self, buffer: &PixelBuffer) -> Classification {
        let ratio = highlight_mask(buffer).coverage();
        let oiliness = self.label_for(ratio);
        debug!(ratio, label = %oiliness, "oiliness");
        Classification {
            label: Label::Oiliness(oiliness),
            statistic: ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gray(value: u8) -> PixelBuffer {
        PixelBuffer::from_rgb(RgbImage::from_pixel(10, 10, Rgb([value, value, value])))
    }

    #[test]
    fn ratio_boundary_is_exclusive() {
        let classifier = OilinessClassifier::default();
        assert_eq!(classifier.label_for(0.2), Oiliness::Dry);
        assert_eq!(classifier.label_for(0.2001), Oiliness::Oily);
        assert_eq!(classifier.label_for(0.0), Oiliness::Dry);
    }

    #[test]
    fn highlight_level_is_inclusive() {
        let classifier = OilinessClassifier::default();
        let at_level = classifier.classify(&gray(200));
        assert_eq!(at_level.label, Label::Oiliness(Oiliness::Oily));
        assert_eq!(at_level.statistic, 1.0);
        assert_eq!(classifier.classify(&gray(199)).label, Label::Oiliness(Oiliness::Dry));
    }

    #[test]
    fn uniform_extremes() {
        let classifier = OilinessClassifier::default();
        assert_eq!(classifier.classify(&gray(255)).label, Label::Oiliness(Oiliness::Oily));
        assert_eq!(classifier.classify(&gray(0)).label, Label::Oiliness(Oiliness::Dry));
    }

    #[test]
    fn small_highlight_patch_stays_dry() {
        // A 4 x 4 white patch on a 20 x 20 dark face covers well under 20%.
        let image = RgbImage::from_fn(20, 20, |x, y| {
            if (8..12).contains(&x) && (8..12).contains(&y) {
                Rgb([255, 255, 255])
            } else {
                Rgb([60, 60, 60])
            }
        });
        let result = OilinessClassifier::default().classify(&PixelBuffer::from_rgb(image));
        assert_eq!(result.label, Label::Oiliness(Oiliness::Dry));
        assert!(result.statistic > 0.0 && result.statistic < 0.2);
    }
}
