use tracing::debug;

use super::rules::RuleTable;
use super::{Attribute, Classification, Classifier, Label, SkinTone};
use crate::core_modules::color_space;
use crate::core_modules::pixel_buffer::PixelBuffer;

/// Mean Lab channels in their 8-bit encoding (L scaled to 0..=255, a and b offset by 128).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabMeans {
    pub lightness: f64,
    pub a: f64,
    pub b: f64,
}

impl LabMeans {
    pub fn of(buffer: &PixelBuffer) -> Self {
        let [lightness, a, b] = color_space::to_lab(buffer).channel_means();
        Self { lightness, a, b }
    }
}

/// Light and warm is `Fair`, a middle band of both is `Medium`, everything else `Dark`.
pub struct SkinToneClassifier {
    rules: RuleTable<LabMeans, SkinTone>,
}

impl Default for SkinToneClassifier {
    fn default() -> Self {
        Self {
            rules: RuleTable::new(SkinTone::Dark)
                .rule(|m: &LabMeans| m.lightness > 180.0 && m.b > 130.0, SkinTone::Fair)
                .rule(
                    |m: &LabMeans| {
                        m.lightness > 130.0 && m.lightness <= 180.0 && m.b > 110.0 && m.b <= 130.0
                    },
                    SkinTone::Medium,
                ),
        }
    }
}

impl SkinToneClassifier {
    pub fn label_for(&self, means: &LabMeans) -> SkinTone {
        self.rules.evaluate(means)
    }
}

impl Classifier for SkinToneClassifier {
    fn attribute(&self) -> Attribute {
        Attribute::SkinTone
    }

    fn classify(&self, buffer: &PixelBuffer) -> Classification {
        let means = LabMeans::of(buffer);
        let tone = self.label_for(&means);
        debug!(l = means.lightness, a = means.a, b = means.b, label = %tone, "skin tone");
        Classification {
            label: Label::SkinTone(tone),
            statistic: means.lightness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn uniform(red: u8, green: u8, blue: u8) -> PixelBuffer {
        PixelBuffer::from_rgb(RgbImage::from_pixel(8, 8, Rgb([red, green, blue])))
    }

    fn means(lightness: f64, b: f64) -> LabMeans {
        LabMeans { lightness, a: 128.0, b }
    }

    #[test]
    fn rule_table_boundaries() {
        let classifier = SkinToneClassifier::default();
        assert_eq!(classifier.label_for(&means(181.0, 131.0)), SkinTone::Fair);
        assert_eq!(classifier.label_for(&means(180.0, 131.0)), SkinTone::Dark);
        assert_eq!(classifier.label_for(&means(180.0, 130.0)), SkinTone::Medium);
        assert_eq!(classifier.label_for(&means(131.0, 111.0)), SkinTone::Medium);
        assert_eq!(classifier.label_for(&means(130.0, 120.0)), SkinTone::Dark);
        assert_eq!(classifier.label_for(&means(150.0, 110.0)), SkinTone::Dark);
        // Bright but neutral falls through both bands.
        assert_eq!(classifier.label_for(&means(250.0, 128.0)), SkinTone::Dark);
    }

    #[test]
    fn light_warm_skin_is_fair() {
        let result = SkinToneClassifier::default().classify(&uniform(255, 220, 190));
        assert_eq!(result.label, Label::SkinTone(SkinTone::Fair));
        assert!(result.statistic > 180.0);
    }

    #[test]
    fn mid_gray_is_medium() {
        let result = SkinToneClassifier::default().classify(&uniform(150, 150, 150));
        assert_eq!(result.label, Label::SkinTone(SkinTone::Medium));
    }

    #[test]
    fn black_and_white_are_dark() {
        let classifier = SkinToneClassifier::default();
        assert_eq!(classifier.classify(&uniform(0, 0, 0)).label, Label::SkinTone(SkinTone::Dark));
        assert_eq!(
            classifier.classify(&uniform(255, 255, 255)).label,
            Label::SkinTone(SkinTone::Dark)
        );
    }
}
