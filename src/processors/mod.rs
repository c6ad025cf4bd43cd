//! Deterministic numeric transforms between a decoded image and the model
//! boundary: resizing, normalization, and score post-processing.

pub mod normalization;
pub mod postprocess;
pub mod resize;

pub use normalization::{ChannelOrder, NormalizeImage, TensorLayout};
pub use postprocess::argmax_first;
pub use resize::resize_to_square;
