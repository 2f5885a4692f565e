use tracing::debug;

use super::rules::RuleTable;
use super::{Attribute, Classification, Classifier, Label, Severity};
use crate::core_modules::binary_mask::BinaryMask;
use crate::core_modules::color_space;
use crate::core_modules::contour;
use crate::core_modules::edge_detector;
use crate::core_modules::filters;
use crate::core_modules::pixel_buffer::PixelBuffer;

pub const BLUR_KERNEL: usize = 9;
pub const BLUR_SIGMA: f64 = 2.0;
pub const EDGE_LOW: i32 = 10;
pub const EDGE_HIGH: i32 = 50;

/// Edge map of the heavily smoothed gray image. The wide blur keeps skin texture
/// out, so what remains outlines pore-sized and larger structures.
pub fn pore_edges(buffer: &PixelBuffer) -> BinaryMask {
    let gray = color_space::to_grayscale(buffer);
    let smoothed = filters::gaussian_blur(&gray, BLUR_KERNEL, BLUR_SIGMA);
    edge_detector::detect_edges(&smoothed, EDGE_LOW, EDGE_HIGH)
}

/// Number of outermost edge contours.
pub fn pore_count(buffer: &PixelBuffer) -> usize {
    contour::find_external_contours(&pore_edges(buffer)).len()
}

pub struct PoreClassifier {
    rules: RuleTable<usize, Severity>,
}

impl Default for PoreClassifier {
    fn default() -> Self {
        Self {
            rules: RuleTable::new(Severity::Low)
                .rule(|count: &usize| *count > 100, Severity::Severe)
                .rule(|count: &usize| *count > 50, Severity::Moderate),
        }
    }
}

impl PoreClassifier {
    pub fn label_for(&self, count: usize) -> Severity {
        self.rules.evaluate(&count)
    }
}

impl Classifier for PoreClassifier {
    fn attribute(&self) -> Attribute {
        Attribute::OpenPores
    }

    fn classify(&self, buffer: &PixelBuffer) -> Classification {
        let count = pore_count(buffer);
        let pores = self.label_for(count);
        debug!(count, label = %pores, "pores");
        Classification {
            label: Label::OpenPores(pores),
            statistic: count as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn count_bands() {
        let classifier = PoreClassifier::default();
        assert_eq!(classifier.label_for(0), Severity::Low);
        assert_eq!(classifier.label_for(50), Severity::Low);
        assert_eq!(classifier.label_for(51), Severity::Moderate);
        assert_eq!(classifier.label_for(100), Severity::Moderate);
        assert_eq!(classifier.label_for(101), Severity::Severe);
    }

    #[test]
    fn uniform_face_has_no_pores() {
        for value in [0u8, 200, 255] {
            let face = PixelBuffer::from_rgb(RgbImage::from_pixel(40, 40, Rgb([value; 3])));
            assert_eq!(pore_count(&face), 0);
            assert_eq!(
                PoreClassifier::default().classify(&face).label,
                Label::OpenPores(Severity::Low)
            );
        }
    }

    #[test]
    fn single_dark_dot_is_one_pore() {
        let face = PixelBuffer::from_rgb(RgbImage::from_fn(40, 40, |x, y| {
            if (18..23).contains(&x) && (18..23).contains(&y) {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        }));
        assert!(pore_count(&face) >= 1);
        assert!(pore_edges(&face).count() > 0);
    }

    #[test]
    fn dense_grid_of_dots_is_severe() {
        // 11 x 11 dark dots, far enough apart that their edge rings never touch.
        let face = PixelBuffer::from_rgb(RgbImage::from_fn(220, 220, |x, y| {
            let dot = (x + 10) % 20 < 5 && (y + 10) % 20 < 5;
            if dot { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        }));
        let count = pore_count(&face);
        assert!(count > 100, "expected more than 100 contours, got {count}");
        assert_eq!(
            PoreClassifier::default().classify(&face).label,
            Label::OpenPores(Severity::Severe)
        );
    }
}
