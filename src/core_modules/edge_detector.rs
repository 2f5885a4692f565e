// THEORY:
// Gradient edge detection with two-threshold hysteresis.
//
// Algorithm steps:
// 1.  **Gradients**: 3x3 Sobel derivatives in x and y. Pixels past the image border
//     repeat the nearest edge pixel. The magnitude is the L1 norm |gx| + |gy|.
// 2.  **Non-Maximum Suppression**: A pixel survives only if its magnitude exceeds
//     `low` and it is a local maximum along the gradient direction, quantized to
//     horizontal, vertical or one of the two diagonals. Ties along a ridge keep the
//     first pixel only, so a sharp step yields a one-pixel-wide line.
// 3.  **Hysteresis**: Survivors above `high` are strong edges. Weak survivors are
//     kept only if they connect (8-neighborhood) to a strong edge.

use image::GrayImage;

use crate::core_modules::binary_mask::BinaryMask;

// tan(22.5 deg) and tan(67.5 deg)
const TAN_22_5: f64 = 0.414_213_56;
const TAN_67_5: f64 = 2.414_213_56;

struct Gradients {
    width: usize,
    height: usize,
    gx: Vec<i32>,
    gy: Vec<i32>,
    magnitude: Vec<i32>,
}

impl Gradients {
    fn sobel(image: &GrayImage) -> Self {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let raw = image.as_raw();
        let at = |x: isize, y: isize| -> i32 {
            let cx = x.clamp(0, width as isize - 1) as usize;
            let cy = y.clamp(0, height as isize - 1) as usize;
            raw[cy * width + cx] as i32
        };

        let mut gx = vec![0i32; width * height];
        let mut gy = vec![0i32; width * height];
        for y in 0..height as isize {
            for x in 0..width as isize {
                let index = y as usize * width + x as usize;
                gx[index] = (at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2 * at(x - 1, y) + at(x - 1, y + 1));
                gy[index] = (at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2 * at(x, y - 1) + at(x + 1, y - 1));
            }
        }
        let magnitude = gx.iter().zip(&gy).map(|(dx, dy)| dx.abs() + dy.abs()).collect();

        Self {
            width,
            height,
            gx,
            gy,
            magnitude,
        }
    }

    /// Magnitude at `(x, y)`, zero outside the image.
    #[inline]
    fn magnitude_at(&self, x: isize, y: isize) -> i32 {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return 0;
        }
        self.magnitude[y as usize * self.width + x as usize]
    }

    fn is_local_maximum(&self, x: isize, y: isize) -> bool {
        let index = y as usize * self.width + x as usize;
        let m = self.magnitude[index];
        let (dx, dy) = (self.gx[index], self.gy[index]);
        let (ax, ay) = (dx.abs() as f64, dy.abs() as f64);

        if ay < ax * TAN_22_5 {
            m > self.magnitude_at(x - 1, y) && m >= self.magnitude_at(x + 1, y)
        } else if ay > ax * TAN_67_5 {
            m > self.magnitude_at(x, y - 1) && m >= self.magnitude_at(x, y + 1)
        } else {
            let step: isize = if (dx < 0) != (dy < 0) { -1 } else { 1 };
            m > self.magnitude_at(x - step, y - 1) && m > self.magnitude_at(x + step, y + 1)
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EdgeClass {
    Suppressed,
    Weak,
    Strong,
}

/// Binary edge map of `image`. `low` and `high` bound the L1 Sobel magnitude.
pub fn detect_edges(image: &GrayImage, low: i32, high: i32) -> BinaryMask {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return BinaryMask::new(width, height);
    }

    // --- 1. Gradients ---
    let gradients = Gradients::sobel(image);
    let (w, h) = (width as usize, height as usize);

    // --- 2. Non-Maximum Suppression ---
    let mut classes = vec![EdgeClass::Suppressed; w * h];
    let mut frontier: Vec<usize> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let index = y * w + x;
            let m = gradients.magnitude[index];
            if m <= low || !gradients.is_local_maximum(x as isize, y as isize) {
                continue;
            }
            if m > high {
                classes[index] = EdgeClass::Strong;
                frontier.push(index);
            } else {
                classes[index] = EdgeClass::Weak;
            }
        }
    }

    // --- 3. Hysteresis ---
    while let Some(index) = frontier.pop() {
        let (x, y) = ((index % w) as isize, (index / w) as isize);
        for dy in -1..=1isize {
            for dx in -1..=1isize {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let neighbour = ny as usize * w + nx as usize;
                if classes[neighbour] == EdgeClass::Weak {
                    classes[neighbour] = EdgeClass::Strong;
                    frontier.push(neighbour);
                }
            }
        }
    }

    BinaryMask::from_fn(width, height, |x, y| {
        classes[y as usize * w + x as usize] == EdgeClass::Strong
    })
}
