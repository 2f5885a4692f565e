pub mod image_helper {
    use std::fs::File;
    use std::io::BufWriter;
    use std::path::Path;

    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, GrayImage, ImageEncoder};

    use crate::core_modules::binary_mask::BinaryMask;

    /// Writes an 8-bit single-channel buffer as PNG.
    pub fn save(
        path: &Path,
        width: u32,
        height: u32,
        buffer: &[u8],
    ) -> Result<(), image::error::ImageError> {
        let output = BufWriter::new(File::create(path)?);
        let encoder = PngEncoder::new(output);

        encoder.write_image(buffer, width, height, ExtendedColorType::L8)?;

        Ok(())
    }

    pub fn save_gray(path: &Path, image: &GrayImage) -> Result<(), image::error::ImageError> {
        save(path, image.width(), image.height(), image.as_raw())
    }

    /// Foreground is written white, background black.
    pub fn save_mask(path: &Path, mask: &BinaryMask) -> Result<(), image::error::ImageError> {
        save_gray(path, &mask.to_image())
    }
}
