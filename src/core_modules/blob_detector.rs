// THEORY:
// The `BlobDetector` is the engine of the Spatial Grouping Layer. It implements
// binary connected-component analysis by region growing: every foreground pixel
// that has not been claimed yet becomes the seed of a new region, and the region
// is grown outwards until no unclaimed neighbor is left.
//
// Key architectural principles & algorithm steps:
// 1.  **Raster Seeding**: The mask is scanned row by row. The first unclaimed
//     foreground pixel found is the seed of the next region, so labels are handed
//     out in order of first encounter and the labeling is deterministic.
// 2.  **Region Growing**: Each region is grown with an explicit stack (no
//     recursion, so large regions cannot overflow the call stack). Whether
//     diagonal neighbors belong to the same region is decided by `Connectivity`.
// 3.  **Data Aggregation**: While a region grows, its bounding box, area and
//     center of mass are accumulated and packaged into a `SmartBlob`.
// 4.  **Stateless Utility**: `find_blobs` takes one mask and returns one labeling.
//     It keeps nothing between calls.

use crate::core_modules::binary_mask::BinaryMask;
use crate::core_modules::smart_blob::{Point, SmartBlob};

pub mod blob_detector {
    use super::*;

    const FOUR_NEIGHBOURS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    const EIGHT_NEIGHBOURS: [(i64, i64); 8] = [
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];

    /// Which neighbors count as touching.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Connectivity {
        /// Edge-sharing neighbors only.
        Four,
        /// Edge- and corner-sharing neighbors.
        #[default]
        Eight,
    }

    impl Connectivity {
        fn offsets(self) -> &'static [(i64, i64)] {
            match self {
                Connectivity::Four => &FOUR_NEIGHBOURS,
                Connectivity::Eight => &EIGHT_NEIGHBOURS,
            }
        }
    }

    /// Per-pixel region labels. Background is 0, regions are `1..=count`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ComponentLabels {
        width: u32,
        height: u32,
        labels: Vec<u32>,
        count: u32,
    }

    impl ComponentLabels {
        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        #[inline]
        pub fn label(&self, x: u32, y: u32) -> u32 {
            self.labels[y as usize * self.width as usize + x as usize]
        }

        /// Number of distinct regions.
        pub fn count(&self) -> u32 {
            self.count
        }
    }

    /// The labeling of a mask together with one summary per region.
    #[derive(Debug, Clone)]
    pub struct BlobMap {
        pub labels: ComponentLabels,
        /// Ordered by id; `blobs[i].id == i + 1`.
        pub blobs: Vec<SmartBlob>,
    }

    impl BlobMap {
        pub fn count(&self) -> usize {
            self.blobs.len()
        }
    }

    /// Labels every connected foreground region of `mask` and summarizes each one.
    pub fn find_blobs(mask: &BinaryMask, connectivity: Connectivity) -> BlobMap {
        let (width, height) = (mask.width(), mask.height());
        let mut labels = vec![0u32; width as usize * height as usize];
        let mut blobs: Vec<SmartBlob> = Vec::new();

        // --- 1. Raster Seeding ---
        for y in 0..height {
            for x in 0..width {
                let index = y as usize * width as usize + x as usize;
                if !mask.get(x, y) || labels[index] != 0 {
                    continue;
                }

                // --- 2. Region Growing ---
                let blob_id = blobs.len() as u32 + 1;
                let blob = grow_region(Point::new(x, y), mask, &mut labels, blob_id, connectivity);
                blobs.push(blob);
            }
        }

        BlobMap {
            labels: ComponentLabels {
                width,
                height,
                labels,
                count: blobs.len() as u32,
            },
            blobs,
        }
    }

    /// Labeling only, for callers that do not need the per-region summaries.
    pub fn label_components(mask: &BinaryMask, connectivity: Connectivity) -> ComponentLabels {
        find_blobs(mask, connectivity).labels
    }

    /// Depth-first flood from `seed`, writing `blob_id` into `labels`.
    fn grow_region(
        seed: Point,
        mask: &BinaryMask,
        labels: &mut [u32],
        blob_id: u32,
        connectivity: Connectivity,
    ) -> SmartBlob {
        let width = mask.width() as i64;
        let height = mask.height() as i64;

        let mut stack: Vec<Point> = vec![seed];
        labels[seed.y as usize * width as usize + seed.x as usize] = blob_id;

        let (mut min_x, mut min_y) = (seed.x, seed.y);
        let (mut max_x, mut max_y) = (seed.x, seed.y);
        let (mut sum_x, mut sum_y) = (0u64, 0u64);
        let mut size_in_pixels = 0usize;

        while let Some(current) = stack.pop() {
            // --- 3. Data Aggregation ---
            size_in_pixels += 1;
            sum_x += current.x as u64;
            sum_y += current.y as u64;
            min_x = min_x.min(current.x);
            min_y = min_y.min(current.y);
            max_x = max_x.max(current.x);
            max_y = max_y.max(current.y);

            for (dx, dy) in connectivity.offsets() {
                let nx = current.x as i64 + dx;
                let ny = current.y as i64 + dy;
                if nx < 0 || nx >= width || ny < 0 || ny >= height {
                    continue;
                }

                let index = ny as usize * width as usize + nx as usize;
                if labels[index] == 0 && mask.get(nx as u32, ny as u32) {
                    labels[index] = blob_id;
                    stack.push(Point::new(nx as u32, ny as u32));
                }
            }
        }

        SmartBlob {
            id: blob_id,
            seed,
            bounding_box: (Point::new(min_x, min_y), Point::new(max_x, max_y)),
            size_in_pixels,
            center_of_mass: (
                sum_x as f64 / size_in_pixels as f64,
                sum_y as f64 / size_in_pixels as f64,
            ),
        }
    }
}
