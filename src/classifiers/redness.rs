use tracing::debug;

use super::rules::RuleTable;
use super::{Attribute, Classification, Classifier, Label, Severity};
use crate::core_modules::binary_mask::BinaryMask;
use crate::core_modules::color_space::{self, ColorBuffer};
use crate::core_modules::pixel_buffer::PixelBuffer;

/// An inclusive box in the 8-bit HSV encoding (hue 0..=180).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|channel| self.lower[channel] <= hsv[channel] && hsv[channel] <= self.upper[channel])
    }
}

/// Red wraps around hue 0, so it takes one band on each side of the wheel.
pub const RED_BANDS: [HsvRange; 2] = [
    HsvRange {
        lower: [0, 50, 50],
        upper: [10, 255, 255],
    },
    HsvRange {
        lower: [170, 50, 50],
        upper: [180, 255, 255],
    },
];

fn band_mask(hsv: &ColorBuffer, band: &HsvRange) -> BinaryMask {
    let (width, height) = hsv.dimensions();
    let mut mask = BinaryMask::new(width, height);
    for (index, pixel) in hsv.pixels().enumerate() {
        if band.contains(pixel) {
            mask.set(index as u32 % width, index as u32 / width, true);
        }
    }
    mask
}

/// Union of the per-band masks over the HSV image.
pub fn red_mask(buffer: &PixelBuffer) -> BinaryMask {
    let hsv = color_space::to_hsv(buffer);
    let [low, high] = RED_BANDS.map(|band| band_mask(&hsv, &band));
    low.union(&high)
}

pub struct RednessClassifier {
    rules: RuleTable<f64, Severity>,
}

impl Default for RednessClassifier {
    fn default() -> Self {
        Self {
            rules: RuleTable::new(Severity::Low)
                .rule(|percent: &f64| *percent > 15.0, Severity::Severe)
                .rule(|percent: &f64| *percent > 5.0, Severity::Moderate),
        }
    }
}

impl RednessClassifier {
    pub fn label_for(&self, red_percentage: f64) -> Severity {
        self.rules.evaluate(&red_percentage)
    }
}

impl Classifier for RednessClassifier {
    fn attribute(&self) -> Attribute {
        Attribute::Redness
    }

    fn classify(&self, buffer: &PixelBuffer) -> Classification {
        let mask = red_mask(buffer);
        let percentage = 100.0 * mask.count() as f64 / mask.len().max(1) as f64;
        let redness = self.label_for(percentage);
        debug!(percentage, label = %redness, "redness");
        Classification {
            label: Label::Redness(redness),
            statistic: percentage,
        }
    }
}
