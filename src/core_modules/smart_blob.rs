// THEORY:
// A `SmartBlob` is the summary of one connected foreground region of a
// `BinaryMask`. The blob detector produces them; the blemish classifier only
// needs their number, while diagnostics and tests read the geometry.
//
// Key architectural principles:
// 1.  **Stateless Data Container**: A blob is a plain record of one region in one
//     image. It does not own pixels and holds no reference back to the mask.
// 2.  **Label Identity**: `id` equals the value the region carries in the
//     component labeling, so a blob can always be matched to its pixels.
// 3.  **Deterministic Seed**: `seed` is the region's first pixel in raster order.
//     Labels are handed out in seed order, which makes every run over the same
//     mask produce the same ids.

/// A pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// One connected foreground region.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartBlob {
    /// The region's label in the component labeling (1-based).
    pub id: u32,
    /// First pixel of the region in raster order.
    pub seed: Point,
    /// Top-left and bottom-right corners, inclusive.
    pub bounding_box: (Point, Point),
    pub size_in_pixels: usize,
    /// Unweighted mean of the member pixel coordinates.
    pub center_of_mass: (f64, f64),
}

impl SmartBlob {
    pub fn width(&self) -> u32 {
        self.bounding_box.1.x - self.bounding_box.0.x + 1
    }

    pub fn height(&self) -> u32 {
        self.bounding_box.1.y - self.bounding_box.0.y + 1
    }
}
