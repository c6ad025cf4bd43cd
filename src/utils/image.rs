//! Utility functions for image handling.
//!
//! These helpers form the seam to the decoded-image provider: anything that
//! can produce an 8-bit RGB image (camera capture, gallery selection, a file
//! on disk) can feed the classifier.

use crate::core::ClassifierError;
use image::{DynamicImage, ImageBuffer, RgbImage};

/// Converts a DynamicImage to an RgbImage.
///
/// This function takes a DynamicImage (which can be in any format) and
/// converts it to an RgbImage (8-bit RGB format).
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Arguments
///
/// * `path` - A reference to the path of the image file to load
///
/// # Returns
///
/// * `Ok(RgbImage)` - The loaded and converted RGB image
/// * `Err(ClassifierError)` - An error if the image could not be loaded
///
/// # Errors
///
/// This function will return a [`ClassifierError::ImageLoad`] error if the
/// image cannot be loaded from the specified path.
pub fn load_image(path: &std::path::Path) -> Result<RgbImage, ClassifierError> {
    let img = image::open(path).map_err(ClassifierError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

/// Creates an RgbImage from raw pixel data.
///
/// The data must be in RGB format (3 bytes per pixel) and the length must
/// match the specified width and height.
///
/// # Arguments
///
/// * `width` - The width of the image in pixels
/// * `height` - The height of the image in pixels
/// * `data` - A vector containing the raw pixel data (RGB format)
///
/// # Returns
///
/// * `Some(RgbImage)` - The created RGB image if the data is valid
/// * `None` - If the data length doesn't match the specified dimensions
pub fn create_rgb_image(width: u32, height: u32, data: Vec<u8>) -> Option<RgbImage> {
    if data.len() != (width * height * 3) as usize {
        return None;
    }

    ImageBuffer::from_raw(width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_image_missing_file_fails() {
        let result = load_image(std::path::Path::new("no_such_image.jpg"));
        assert!(matches!(result, Err(ClassifierError::ImageLoad(_))));
    }

    #[test]
    fn test_create_rgb_image_validates_length() {
        assert!(create_rgb_image(2, 2, vec![0u8; 12]).is_some());
        assert!(create_rgb_image(2, 2, vec![0u8; 11]).is_none());
    }
}
