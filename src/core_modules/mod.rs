pub mod binary_mask;
pub mod blob_detector;
pub mod color_space;
pub mod contour;
pub mod edge_detector;
pub mod filters;
pub mod pixel;
pub mod pixel_buffer;
pub mod smart_blob;
pub mod utils;
