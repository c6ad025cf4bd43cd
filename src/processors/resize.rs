//! Image resizing to the model's fixed input size.

use image::imageops::{self, FilterType};
use image::RgbImage;

/// Resizes an image to a fixed square dimension.
///
/// The bundled model has a fixed input shape, so the aspect ratio is not
/// preserved. The filter defaults to bilinear ([`FilterType::Triangle`]) at
/// the call sites in this crate, matching the interpolation the model was
/// validated with.
///
/// # Arguments
///
/// * `img` - The image to resize
/// * `size` - Target edge length in pixels
/// * `filter` - Interpolation filter to use
///
/// # Returns
///
/// A new `size`x`size` image.
pub fn resize_to_square(img: &RgbImage, size: u32, filter: FilterType) -> RgbImage {
    imageops::resize(img, size, size, filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn test_resize_produces_square_dimensions() {
        let img = gradient_image(640, 480);
        let resized = resize_to_square(&img, 224, FilterType::Triangle);
        assert_eq!(resized.dimensions(), (224, 224));
    }

    #[test]
    fn test_resize_upscales_small_images() {
        let img = gradient_image(32, 48);
        let resized = resize_to_square(&img, 224, FilterType::Triangle);
        assert_eq!(resized.dimensions(), (224, 224));
    }

    #[test]
    fn test_resize_at_target_size_is_near_identity() {
        let img = gradient_image(224, 224);
        let resized = resize_to_square(&img, 224, FilterType::Triangle);

        for (original, resized) in img.pixels().zip(resized.pixels()) {
            for c in 0..3 {
                let delta = (original[c] as i16 - resized[c] as i16).abs();
                assert!(delta <= 1, "channel drifted by {delta} on same-size resize");
            }
        }
    }
}
