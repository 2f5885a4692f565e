// THEORY:
// Smoothing and binarization, the two pixel-neighborhood operations every
// mask-based classifier starts with.
//
// 1.  **Gaussian Blur**: A separable convolution (rows, then columns) that
//     suppresses single-pixel sensor noise before thresholding. Kernel derivation
//     follows the usual convention: a non-positive sigma with a small odd kernel
//     (1, 3, 5, 7) selects a fixed binomial-like table, any other non-positive
//     sigma is derived from the kernel size, and positive sigmas are used as given.
//     Borders are reflected without repeating the edge pixel (`dcb|abcd|cba`).
// 2.  **Thresholding**: A fixed level splits a grayscale image into a
//     `BinaryMask`. Polarity decides whether bright or dark pixels become the
//     foreground.

use image::{GrayImage, Luma};

use crate::core_modules::binary_mask::BinaryMask;

const SMALL_GAUSSIAN_KERNELS: [&[f64]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Which side of the threshold level becomes foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// `pixel >= level` is foreground.
    Bright,
    /// `pixel < level` is foreground.
    Dark,
}

/// Normalized 1-D Gaussian weights for an odd kernel `size`.
pub fn gaussian_kernel(size: usize, sigma: f64) -> Vec<f64> {
    debug_assert!(size % 2 == 1, "gaussian kernel size must be odd, got {size}");

    if sigma <= 0.0 && size <= 7 {
        return SMALL_GAUSSIAN_KERNELS[size / 2].to_vec();
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let center = (size as f64 - 1.0) / 2.0;
    let scale = -0.5 / (sigma * sigma);

    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let offset = i as f64 - center;
            (scale * offset * offset).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|weight| weight / total).collect()
}

/// Mirror an out-of-range index back into `0..len` without repeating the edge.
#[inline]
fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let wrapped = index.rem_euclid(period);
    if wrapped >= len as isize {
        (period - wrapped) as usize
    } else {
        wrapped as usize
    }
}

/// Separable `size` x `size` Gaussian blur.
pub fn gaussian_blur(image: &GrayImage, size: usize, sigma: f64) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let kernel = gaussian_kernel(size, sigma);
    let radius = (size / 2) as isize;
    let (w, h) = (width as usize, height as usize);
    let source = image.as_raw();

    // --- 1. Horizontal pass, kept in floating point ---
    let mut horizontal = vec![0.0f64; w * h];
    for y in 0..h {
        let row = &source[y * w..(y + 1) * w];
        for x in 0..w {
            horizontal[y * w + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    weight * row[reflect_101(x as isize + k as isize - radius, w)] as f64
                })
                .sum();
        }
    }

    // --- 2. Vertical pass, rounded once on output ---
    GrayImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let value: f64 = kernel
            .iter()
            .enumerate()
            .map(|(k, weight)| {
                weight * horizontal[reflect_101(y as isize + k as isize - radius, h) * w + x]
            })
            .sum();
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

/// Fixed-level binarization.
pub fn threshold(image: &GrayImage, level: u8, polarity: Polarity) -> BinaryMask {
    BinaryMask::from_fn(image.width(), image.height(), |x, y| {
        let value = image.get_pixel(x, y).0[0];
        match polarity {
            Polarity::Bright => value >= level,
            Polarity::Dark => value < level,
        }
    })
}
