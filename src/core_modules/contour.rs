// THEORY:
// External contour retrieval over a binary mask: one contour per foreground
// region that is not enclosed by another region. Regions sitting inside a hole
// of another region are skipped, together with the holes themselves.
//
// Algorithm steps:
// 1.  **Regions**: Foreground is labeled with 8-connectivity and background with
//     4-connectivity, the complementary pairing that keeps a diagonal line closed.
// 2.  **Outer Background**: Background regions touching the image border are the
//     outside world. Every other background region is a hole.
// 3.  **External Test**: A region's seed (first pixel in raster order) always has
//     background to its left unless it sits on column 0. The region is external
//     iff that background is outer.
// 4.  **Border Tracing**: External regions are traced clockwise from their seed by
//     sweeping the 8-neighborhood, stopping when the walk returns to the seed and
//     is about to repeat its first step.

use crate::core_modules::binary_mask::BinaryMask;
use crate::core_modules::blob_detector::blob_detector::{self, Connectivity};
use crate::core_modules::smart_blob::Point;

/// Clockwise on a y-down grid, starting east.
const NEIGHBOURS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const WEST: usize = 4;

/// Ordered boundary pixels of one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub fn find_external_contours(mask: &BinaryMask) -> Vec<Contour> {
    if mask.is_empty() {
        return Vec::new();
    }

    // --- 1. Regions ---
    let foreground = blob_detector::find_blobs(mask, Connectivity::Eight);
    if foreground.count() == 0 {
        return Vec::new();
    }
    let background = blob_detector::label_components(&mask.inverted(), Connectivity::Four);

    // --- 2. Outer Background ---
    let (width, height) = (mask.width(), mask.height());
    let mut outer = vec![false; background.count() as usize + 1];
    let border = (0..width)
        .flat_map(|x| [(x, 0), (x, height - 1)])
        .chain((0..height).flat_map(|y| [(0, y), (width - 1, y)]));
    for (x, y) in border {
        if !mask.get(x, y) {
            outer[background.label(x, y) as usize] = true;
        }
    }

    // --- 3. External Test & 4. Border Tracing ---
    foreground
        .blobs
        .iter()
        .filter(|blob| blob.seed.x == 0 || outer[background.label(blob.seed.x - 1, blob.seed.y) as usize])
        .map(|blob| Contour {
            points: trace_border(mask, blob.seed),
        })
        .collect()
}

/// First foreground neighbor of `from`, sweeping clockwise from direction `start`.
fn next_boundary(mask: &BinaryMask, from: Point, start: usize) -> Option<(Point, usize)> {
    (0..NEIGHBOURS.len())
        .map(|step| (start + step) % NEIGHBOURS.len())
        .find_map(|direction| {
            let (dx, dy) = NEIGHBOURS[direction];
            let x = from.x as i64 + dx;
            let y = from.y as i64 + dy;
            let inside = x >= 0 && y >= 0 && x < mask.width() as i64 && y < mask.height() as i64;
            (inside && mask.get(x as u32, y as u32)).then(|| (Point::new(x as u32, y as u32), direction))
        })
}

fn trace_border(mask: &BinaryMask, seed: Point) -> Vec<Point> {
    let mut points = vec![seed];
    let Some((second, mut direction)) = next_boundary(mask, seed, WEST) else {
        return points;
    };

    let budget = 4 * mask.len() + 8;
    let mut current = second;
    for _ in 0..budget {
        // Resume the sweep just past the pixel we came from.
        let Some((next, next_direction)) = next_boundary(mask, current, (direction + 5) % 8) else {
            break;
        };
        if current == seed && next == second {
            break;
        }
        points.push(current);
        current = next;
        direction = next_direction;
    }
    points
}
