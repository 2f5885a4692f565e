// THEORY:
// The `color_space` module is the Color-Space Transform Utility. It lifts the
// single-pixel heuristics of `Pixel` to whole buffers and encodes the results into
// 8-bit channels, so that every classifier thresholds against the same integer
// scales regardless of which space it works in.
//
// 8-bit encodings (the same ones the heuristic thresholds were tuned against):
// - Grayscale: round(0.299 R + 0.587 G + 0.114 B)
// - Lab:       L* * 255 / 100, a* + 128, b* + 128
// - HSV:       hue degrees / 2 (so 0..=180), saturation * 255, value * 255
//
// All math happens in floating point; rounding and saturation happen exactly once,
// on output. Every function here is pure and returns a new buffer of the source's
// dimensions.

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_buffer::PixelBuffer;

/// Which interpretation the three channels of a [`ColorBuffer`] carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Lightness, green-red opponent, blue-yellow opponent.
    Lab,
    /// Hue (0..=180), saturation, value.
    Hsv,
}

/// A three-channel 8-bit buffer in a non-RGB color space.
#[derive(Debug, Clone)]
pub struct ColorBuffer {
    space: ColorSpace,
    image: RgbImage,
}

impl ColorBuffer {
    pub fn space(&self) -> ColorSpace {
        self.space
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Row-major channel triples.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.image.pixels().map(|pixel| pixel.0)
    }

    /// Arithmetic mean of each channel over all pixels.
    pub fn channel_means(&self) -> [f64; 3] {
        let mut sums = [0u64; 3];
        for [first, second, third] in self.pixels() {
            sums[0] += first as u64;
            sums[1] += second as u64;
            sums[2] += third as u64;
        }
        let count = (self.image.width() as u64 * self.image.height() as u64).max(1) as f64;
        sums.map(|sum| sum as f64 / count)
    }
}

#[inline]
fn saturate(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Weighted channel reduction to a single luminance channel.
pub fn to_grayscale(buffer: &PixelBuffer) -> GrayImage {
    let source = buffer.as_rgb();
    GrayImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        let pixel = Pixel::from(*source.get_pixel(x, y));
        Luma([saturate(pixel.luminance() as f32)])
    })
}

pub fn to_lab(buffer: &PixelBuffer) -> ColorBuffer {
    let source = buffer.as_rgb();
    let image = RgbImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        let (lightness, a, b) = Pixel::from(*source.get_pixel(x, y)).lab();
        Rgb([
            saturate(lightness * 255.0 / 100.0),
            saturate(a + 128.0),
            saturate(b + 128.0),
        ])
    });
    ColorBuffer {
        space: ColorSpace::Lab,
        image,
    }
}

pub fn to_hsv(buffer: &PixelBuffer) -> ColorBuffer {
    let source = buffer.as_rgb();
    let image = RgbImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        let pixel = Pixel::from(*source.get_pixel(x, y));
        Rgb([
            saturate(pixel.hue() / 2.0),
            saturate(pixel.saturation_hsv() * 255.0),
            saturate(pixel.value_hsv() * 255.0),
        ])
    });
    ColorBuffer {
        space: ColorSpace::Hsv,
        image,
    }
}
