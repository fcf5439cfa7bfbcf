//! Image arrays held by viewer layers.
//!
//! `ImageData` keeps n-dimensional pixels in their native element type and
//! provides the `img_as_float`-style conversion used by thresholding.

mod image_data;

pub(crate) use image_data::with_array;

pub use image_data::{ImageData, PixelValue};
