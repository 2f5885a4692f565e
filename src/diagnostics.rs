//! Writes the intermediate images each classifier thresholds against, so a
//! surprising label can be checked by eye.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageError;
use tracing::debug;

use crate::classifiers::{blemish, oiliness, pores, redness};
use crate::core_modules::color_space;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::utils::image_helper::image_helper;

/// Saves `<stem>.<stage>.png` files into `dir` (created if missing) and returns
/// their paths in the order written.
pub fn dump_masks(buffer: &PixelBuffer, dir: &Path, stem: &str) -> Result<Vec<PathBuf>, ImageError> {
    fs::create_dir_all(dir)?;
    let path_for = |stage: &str| dir.join(format!("{stem}.{stage}.png"));
    let mut written = Vec::with_capacity(5);

    let gray = path_for("gray");
    image_helper::save_gray(&gray, &color_space::to_grayscale(buffer))?;
    written.push(gray);

    let masks = [
        ("highlights", oiliness::highlight_mask(buffer)),
        ("red", redness::red_mask(buffer)),
        ("blemishes", blemish::blemish_mask(buffer)),
        ("pore_edges", pores::pore_edges(buffer)),
    ];
    for (stage, mask) in masks {
        let path = path_for(stage);
        image_helper::save_mask(&path, &mask)?;
        written.push(path);
    }

    debug!(dir = %dir.display(), files = written.len(), "dumped masks");
    Ok(written)
}
