// THEORY (1D Pixel Heuristics):
// The `Pixel` module is the most fundamental unit of the analysis engine. It is a
// "dumb" data container for a single RGB pixel plus the single-pixel heuristics the
// color-space transforms are built from. Nothing here reads a neighbor; anything
// that needs more than one pixel (blur, gradients, labeling) lives in the modules
// that operate on whole buffers.
//
// What lives here:
// - Raw channels (RGB) and their normalized form (0..1, still gamma-encoded).
// - Linearized channels via a 256-entry sRGB -> linear `OnceLock` LUT, so the
//   colorimetric path (Lab) is a table lookup and a multiply, never a `powf`
//   per pixel.
//
// Heuristic families:
// - Brightness:     luminance (Rec. 601), HSV value (max)
// - Color strength: chroma (max - min), HSV saturation (chroma / value)
// - Hue:            angle on the color wheel in degrees [0, 360)
// - Opponent color: CIE L*a*b* (D65) from linearized channels
//
// Hue, saturation and value are computed on normalized sRGB (no linearization),
// which is the convention the 8-bit HSV encoding downstream expects. Lab is the
// only heuristic that needs true linear light.

pub mod pixel {
    use std::sync::OnceLock;

    pub type Byte = u8;
    pub type Channel = Byte;
    pub type NormalizedChannel = f32;
    pub type Hue = f32;
    pub type SaturationHSV = f32;
    pub type ValueHSV = f32;
    pub type Chroma = f32;
    pub type Luminance = f64;
    pub type Lightness = f32;
    pub type Opponent = f32;

    // D65 reference white; X and Z are normalized by it before the Lab transfer.
    const WHITE_X: f32 = 0.950456;
    const WHITE_Z: f32 = 1.088754;
    const LAB_EPSILON: f32 = 0.008856;

    // Fast path: 256-entry LUT for sRGB (0..255) -> linear normalized (0..1)
    static SRGB_TO_LINEAR_LUT: OnceLock<[NormalizedChannel; 256]> = OnceLock::new();

    /// A "dumb" data container representing a single RGB pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The red channel value (0.0-1.0).
        pub red_normalized: NormalizedChannel,
        /// The green channel value (0.0-1.0).
        pub green_normalized: NormalizedChannel,
        /// The blue channel value (0.0-1.0).
        pub blue_normalized: NormalizedChannel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                red_normalized: red as NormalizedChannel / 255.0f32,
                green_normalized: green as NormalizedChannel / 255.0f32,
                blue_normalized: blue as NormalizedChannel / 255.0f32,
            }
        }

        #[inline]
        fn srgb_to_linear_normalized_from_byte(srgb_value: Byte) -> NormalizedChannel {
            let table = SRGB_TO_LINEAR_LUT.get_or_init(|| {
                let mut table = [0.0f32; 256];
                for (i, entry) in table.iter_mut().enumerate() {
                    let srgb_normalized = i as NormalizedChannel / 255.0f32;
                    *entry = if srgb_normalized <= 0.04045f32 {
                        srgb_normalized / 12.92f32
                    } else {
                        ((srgb_normalized + 0.055f32) / 1.055f32).powf(2.4f32)
                    };
                }
                table
            });
            table[srgb_value as usize]
        }

        #[inline]
        fn maximum_channel(&self) -> NormalizedChannel {
            self.red_normalized
                .max(self.green_normalized.max(self.blue_normalized))
        }

        #[inline]
        fn minimum_channel(&self) -> NormalizedChannel {
            self.red_normalized
                .min(self.green_normalized.min(self.blue_normalized))
        }

        /// =================================Heuristics==================================

        /// Luminance estimate (Rec. 601 luma) on the 0..255 scale.
        ///
        /// - Interprets perceived brightness as a weighted sum of RGB.
        /// - This is the weighted channel reduction behind every grayscale buffer.
        pub fn luminance(&self) -> Luminance {
            0.299_f64 * self.red as f64 + 0.587_f64 * self.green as f64 + 0.114_f64 * self.blue as f64
        }

        /// HSV Value (V): brightness defined as max(R, G, B), normalized.
        pub fn value_hsv(&self) -> ValueHSV {
            self.maximum_channel()
        }

        /// Chroma (C): color purity = max(R,G,B) - min(R,G,B), normalized.
        pub fn chroma(&self) -> Chroma {
            self.maximum_channel() - self.minimum_channel()
        }

        /// Saturation (HSV): S = chroma / value.
        /// - Drops to zero for black, regardless of hue.
        pub fn saturation_hsv(&self) -> SaturationHSV {
            let maximum_channel = self.maximum_channel();
            if maximum_channel <= 1e-6 {
                return 0.0;
            }
            self.chroma() / maximum_channel
        }

        /// Hue angle in degrees [0, 360).
        ///
        /// - Uses normalized sRGB channels, no linearization.
        /// - Achromatic pixels (chroma ~ 0) report a hue of 0.
        pub fn hue(&self) -> Hue {
            let maximum_channel = self.maximum_channel();
            let chroma = self.chroma();

            if chroma <= 1e-6 {
                return 0.0;
            }

            let inverse_chroma = 1.0 / chroma;

            let (base_difference, sector_offset) = if maximum_channel == self.red_normalized {
                (self.green_normalized - self.blue_normalized, 0.0)
            } else if maximum_channel == self.green_normalized {
                (self.blue_normalized - self.red_normalized, 2.0)
            } else {
                (self.red_normalized - self.green_normalized, 4.0)
            };

            let mut hue_degrees = (base_difference * inverse_chroma + sector_offset) * 60.0;
            if hue_degrees < 0.0 {
                hue_degrees += 360.0;
            }
            hue_degrees
        }

        /// CIE L*a*b* (D65) from LUT-linearized channels.
        ///
        /// Returns `(L*, a*, b*)` in CIE units: L* in 0..100, a* and b* signed and
        /// centered on zero for neutral grays.
        pub fn lab(&self) -> (Lightness, Opponent, Opponent) {
            let red = Self::srgb_to_linear_normalized_from_byte(self.red);
            let green = Self::srgb_to_linear_normalized_from_byte(self.green);
            let blue = Self::srgb_to_linear_normalized_from_byte(self.blue);

            let x = (0.412453f32 * red + 0.357580f32 * green + 0.180423f32 * blue) / WHITE_X;
            let y = 0.212671f32 * red + 0.715160f32 * green + 0.072169f32 * blue;
            let z = (0.019334f32 * red + 0.119193f32 * green + 0.950227f32 * blue) / WHITE_Z;

            let fx = Self::lab_transfer(x);
            let fy = Self::lab_transfer(y);
            let fz = Self::lab_transfer(z);

            let lightness = if y > LAB_EPSILON {
                116.0 * fy - 16.0
            } else {
                903.3 * y
            };
            (lightness, 500.0 * (fx - fy), 200.0 * (fy - fz))
        }

        #[inline]
        fn lab_transfer(t: f32) -> f32 {
            if t > LAB_EPSILON {
                t.cbrt()
            } else {
                7.787 * t + 16.0 / 116.0
            }
        }
    }

    impl From<image::Rgb<Byte>> for Pixel {
        fn from(rgb: image::Rgb<Byte>) -> Self {
            let [red, green, blue] = rgb.0;
            Pixel::new(red, green, blue)
        }
    }

    impl From<Pixel> for image::Rgb<Byte> {
        fn from(pixel: Pixel) -> Self {
            image::Rgb([pixel.red, pixel.green, pixel.blue])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::Pixel;

    #[test]
    fn luminance_weights_green_highest() {
        let red = Pixel::new(255, 0, 0).luminance();
        let green = Pixel::new(0, 255, 0).luminance();
        let blue = Pixel::new(0, 0, 255).luminance();
        assert!(green > red && red > blue);
        assert!((Pixel::new(255, 255, 255).luminance() - 255.0).abs() < 1e-9);
    }

    #[test]
    fn hue_wraps_for_magenta_leaning_red() {
        let hue = Pixel::new(255, 0, 40).hue();
        assert!(hue > 350.0 && hue < 351.0, "hue was {hue}");
        assert_eq!(Pixel::new(255, 0, 0).hue(), 0.0);
        assert!((Pixel::new(0, 0, 255).hue() - 240.0).abs() < 1e-3);
    }

    #[test]
    fn gray_has_no_saturation_or_hue() {
        let gray = Pixel::new(128, 128, 128);
        assert_eq!(gray.saturation_hsv(), 0.0);
        assert_eq!(gray.hue(), 0.0);
        assert_eq!(Pixel::new(0, 0, 0).saturation_hsv(), 0.0);
    }

    #[test]
    fn lab_neutral_axis() {
        let (l, a, b) = Pixel::new(255, 255, 255).lab();
        assert!((l - 100.0).abs() < 0.01);
        assert!(a.abs() < 0.01 && b.abs() < 0.01);

        let (l, a, b) = Pixel::new(0, 0, 0).lab();
        assert_eq!(l, 0.0);
        assert!(a.abs() < 1e-6 && b.abs() < 1e-6);
    }

    #[test]
    fn lab_warm_tone_has_positive_b() {
        let (_, a, b) = Pixel::new(255, 220, 190).lab();
        assert!(a > 0.0);
        assert!(b > 15.0, "b* was {b}");
    }
}
