use image::{GrayImage, Luma};

/// A 2-D grid of foreground/background cells with the dimensions of the image it
/// was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl BinaryMask {
    /// An all-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut is_foreground: impl FnMut(u32, u32) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(is_foreground(x, y));
            }
        }
        Self { width, height, cells }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let index = self.index(x, y);
        self.cells[index] = value;
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Number of foreground cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Foreground cells as a fraction of all cells (0.0 for an empty mask).
    pub fn coverage(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.count() as f64 / self.cells.len() as f64
    }

    /// Cell-wise OR of two masks of equal dimensions.
    pub fn union(&self, other: &BinaryMask) -> BinaryMask {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        BinaryMask {
            width: self.width,
            height: self.height,
            cells: self
                .cells
                .iter()
                .zip(&other.cells)
                .map(|(&a, &b)| a || b)
                .collect(),
        }
    }

    pub fn inverted(&self) -> BinaryMask {
        BinaryMask {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(|&cell| !cell).collect(),
        }
    }

    /// Renders foreground as 255 and background as 0.
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_and_inversion() {
        let left = BinaryMask::from_fn(4, 1, |x, _| x < 2);
        let right = BinaryMask::from_fn(4, 1, |x, _| x == 3);
        let both = left.union(&right);
        assert_eq!(both.count(), 3);
        assert_eq!(both.inverted().count(), 1);
        assert!(!both.get(2, 0));
    }

    #[test]
    fn coverage_is_a_fraction() {
        let mask = BinaryMask::from_fn(10, 10, |x, _| x < 3);
        assert!((mask.coverage() - 0.3).abs() < 1e-12);
        assert_eq!(BinaryMask::new(0, 0).coverage(), 0.0);
    }

    #[test]
    fn renders_to_gray_image() {
        let mut mask = BinaryMask::new(2, 2);
        mask.set(1, 1, true);
        let image = mask.to_image();
        assert_eq!(image.get_pixel(1, 1).0[0], 255);
        assert_eq!(image.get_pixel(0, 1).0[0], 0);
    }
}
