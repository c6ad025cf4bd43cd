//! Image normalization for the lesion model.
//!
//! This module converts a decoded 8-bit RGB image into the floating-point
//! tensor layout the bundled model was trained with. The model expects
//! Caffe-style preprocessing: channels reordered to BGR and fixed per-channel
//! means subtracted, with no scaling and no standard-deviation division. That
//! convention is a hard contract of the model weights and must not be swapped
//! for 0-1 normalization.

use crate::core::{ClassifierError, Tensor4D};
use image::RgbImage;

/// Specifies the per-pixel channel order of the normalized tensor relative to
/// the source RGB image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelOrder {
    /// Keep the source red-green-blue order.
    Rgb,
    /// Reorder to blue-green-red.
    Bgr,
}

/// Specifies the memory layout of the normalized tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TensorLayout {
    /// Channels-first: `(batch, channels, height, width)`.
    Chw,
    /// Channels-last: `(batch, height, width, channels)`.
    Hwc,
}

/// Normalizes images for classification.
///
/// This struct encapsulates the parameters needed to normalize images:
/// per-channel scaling factors, per-channel offsets, channel ordering, and
/// tensor layout. Mean and standard deviation are folded into an affine
/// transform per channel (alpha = scale / std, beta = -mean / std), applied
/// to each pixel value.
#[derive(Debug)]
pub struct NormalizeImage {
    /// Scaling factors for each output channel (alpha = scale / std).
    alpha: [f32; 3],
    /// Offset values for each output channel (beta = -mean / std).
    beta: [f32; 3],
    /// Channel ordering of the output tensor.
    order: ChannelOrder,
    /// Memory layout of the output tensor.
    layout: TensorLayout,
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance with the specified parameters.
    ///
    /// Mean and standard deviation are given in *output* channel order: with
    /// [`ChannelOrder::Bgr`], `mean[0]` is the blue-channel mean.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0)
    /// * `mean` - Optional mean values per output channel (defaults to the
    ///   Caffe BGR means [103.939, 116.779, 123.68])
    /// * `std` - Optional standard deviation values per output channel
    ///   (defaults to [1.0, 1.0, 1.0])
    /// * `order` - Optional channel ordering (defaults to BGR)
    /// * `layout` - Optional tensor layout (defaults to HWC)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * Scale is less than or equal to 0
    /// * Mean or std vectors don't have exactly 3 elements
    /// * Any standard deviation value is less than or equal to 0
    pub fn new(
        scale: Option<f32>,
        mean: Option<Vec<f32>>,
        std: Option<Vec<f32>>,
        order: Option<ChannelOrder>,
        layout: Option<TensorLayout>,
    ) -> Result<Self, ClassifierError> {
        let scale = scale.unwrap_or(1.0);
        let mean = mean.unwrap_or_else(|| vec![103.939, 116.779, 123.68]);
        let std = std.unwrap_or_else(|| vec![1.0, 1.0, 1.0]);
        let order = order.unwrap_or(ChannelOrder::Bgr);
        let layout = layout.unwrap_or(TensorLayout::Hwc);

        if scale <= 0.0 {
            return Err(ClassifierError::config_error(
                "Scale must be greater than 0",
            ));
        }

        if mean.len() != 3 {
            return Err(ClassifierError::config_error(
                "Mean must have exactly 3 elements for RGB input",
            ));
        }

        if std.len() != 3 {
            return Err(ClassifierError::config_error(
                "Std must have exactly 3 elements for RGB input",
            ));
        }

        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(ClassifierError::config_error(format!(
                    "Standard deviation at index {i} must be greater than 0, got {s}"
                )));
            }
        }

        let mut alpha = [0.0f32; 3];
        let mut beta = [0.0f32; 3];
        for c in 0..3 {
            alpha[c] = scale / std[c];
            beta[c] = -mean[c] / std[c];
        }

        Ok(Self {
            alpha,
            beta,
            order,
            layout,
        })
    }

    /// Creates a NormalizeImage instance with the Caffe-style preprocessing
    /// the bundled ResNet50 lesion model was trained with.
    ///
    /// This creates a normalization configuration with:
    /// * Scale: 1.0 (raw 0-255 pixel values)
    /// * Mean: [103.939, 116.779, 123.68] (B, G, R)
    /// * Std: [1.0, 1.0, 1.0]
    /// * Order: BGR
    /// * Layout: HWC
    pub fn for_caffe_bgr() -> Result<Self, ClassifierError> {
        Self::new(None, None, None, None, None)
    }

    /// Maps an output channel index to its source index in the RGB pixel.
    fn source_channel(&self, c: usize) -> usize {
        match self.order {
            ChannelOrder::Rgb => c,
            ChannelOrder::Bgr => 2 - c,
        }
    }

    /// Normalizes a single image to a flat buffer.
    ///
    /// Pixels are scanned row-major, left-to-right, top-to-bottom. In HWC
    /// layout the buffer holds the reordered, normalized channel triplet of
    /// each pixel in turn.
    pub fn normalize(&self, img: &RgbImage) -> Vec<f32> {
        let (width, height) = img.dimensions();
        let channels = 3usize;
        let mut result = vec![0.0f32; (width * height) as usize * channels];

        match self.layout {
            TensorLayout::Hwc => {
                for y in 0..height {
                    for x in 0..width {
                        let pixel = img.get_pixel(x, y);
                        for c in 0..channels {
                            let value = pixel[self.source_channel(c)] as f32;
                            let dst_idx =
                                (y * width + x) as usize * channels + c;
                            result[dst_idx] = value * self.alpha[c] + self.beta[c];
                        }
                    }
                }
            }
            TensorLayout::Chw => {
                let plane = (width * height) as usize;
                for c in 0..channels {
                    let src = self.source_channel(c);
                    for y in 0..height {
                        for x in 0..width {
                            let pixel = img.get_pixel(x, y);
                            let value = pixel[src] as f32;
                            let dst_idx = c * plane + (y * width + x) as usize;
                            result[dst_idx] = value * self.alpha[c] + self.beta[c];
                        }
                    }
                }
            }
        }

        result
    }

    /// Normalizes a single image and returns it as a 4D tensor with a leading
    /// batch dimension of 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the flat buffer cannot be shaped into the tensor,
    /// which indicates an internal size mismatch.
    pub fn normalize_to(&self, img: &RgbImage) -> Result<Tensor4D, ClassifierError> {
        let (width, height) = img.dimensions();
        let result = self.normalize(img);
        let result_len = result.len();

        let shape = match self.layout {
            TensorLayout::Hwc => (1, height as usize, width as usize, 3),
            TensorLayout::Chw => (1, 3, height as usize, width as usize),
        };

        ndarray::Array4::from_shape_vec(shape, result).map_err(|e| {
            ClassifierError::tensor_operation(
                &format!(
                    "failed to create {:?} tensor for {}x{} image from buffer of {} values",
                    self.layout, width, height, result_len
                ),
                e,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb(rgb))
    }

    #[test]
    fn test_zero_image_yields_negated_means() {
        let normalize = NormalizeImage::for_caffe_bgr().unwrap();
        let buffer = normalize.normalize(&solid_image(4, 4, [0, 0, 0]));

        assert_eq!(buffer.len(), 4 * 4 * 3);
        for triplet in buffer.chunks_exact(3) {
            assert_eq!(triplet[0], -103.939);
            assert_eq!(triplet[1], -116.779);
            assert_eq!(triplet[2], -123.68);
        }
    }

    #[test]
    fn test_bgr_reorder() {
        let normalize = NormalizeImage::for_caffe_bgr().unwrap();
        let buffer = normalize.normalize(&solid_image(1, 1, [10, 20, 30]));

        // b, g, r order after mean subtraction
        assert_eq!(buffer[0], 30.0 - 103.939);
        assert_eq!(buffer[1], 20.0 - 116.779);
        assert_eq!(buffer[2], 10.0 - 123.68);
    }

    #[test]
    fn test_hwc_scan_order_is_row_major() {
        let normalize = NormalizeImage::new(
            Some(1.0),
            Some(vec![0.0, 0.0, 0.0]),
            None,
            Some(ChannelOrder::Rgb),
            Some(TensorLayout::Hwc),
        )
        .unwrap();

        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgb([1, 2, 3]));
        img.put_pixel(1, 0, image::Rgb([4, 5, 6]));
        img.put_pixel(0, 1, image::Rgb([7, 8, 9]));
        img.put_pixel(1, 1, image::Rgb([10, 11, 12]));

        let buffer = normalize.normalize(&img);
        let expected: Vec<f32> = (1..=12).map(|v| v as f32).collect();
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_chw_layout_groups_by_channel() {
        let normalize = NormalizeImage::new(
            Some(1.0),
            Some(vec![0.0, 0.0, 0.0]),
            None,
            Some(ChannelOrder::Rgb),
            Some(TensorLayout::Chw),
        )
        .unwrap();

        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([1, 2, 3]));
        img.put_pixel(1, 0, image::Rgb([4, 5, 6]));

        let buffer = normalize.normalize(&img);
        assert_eq!(buffer, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_normalize_to_shape_is_nhwc() {
        let normalize = NormalizeImage::for_caffe_bgr().unwrap();
        let tensor = normalize.normalize_to(&solid_image(224, 224, [0, 0, 0])).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn test_invalid_std_rejected() {
        let result = NormalizeImage::new(None, None, Some(vec![1.0, 0.0, 1.0]), None, None);
        assert!(matches!(result, Err(ClassifierError::ConfigError { .. })));
    }

    #[test]
    fn test_invalid_mean_length_rejected() {
        let result = NormalizeImage::new(None, Some(vec![1.0]), None, None, None);
        assert!(matches!(result, Err(ClassifierError::ConfigError { .. })));
    }
}
