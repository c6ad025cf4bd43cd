//! # Lesion Classifier
//!
//! A Rust library that classifies skin lesion photos into three classes
//! (`Non_Cancer`, `benign`, `malignant`) using a bundled pre-trained ONNX
//! model.
//!
//! The pipeline is deliberately small: resize a decoded RGB photo to the
//! model's fixed 224x224 input, apply the Caffe-style BGR mean subtraction
//! the model was trained with, run one forward pass through ONNX Runtime,
//! and shape the three output scores into a labeled, ranked result.
//!
//! ## Modules
//!
//! * [`core`] - Error handling, tensor aliases, and the inference engine
//! * [`domain`] - Value types: [`LesionClass`](domain::LesionClass) and
//!   [`ClassificationResult`](domain::ClassificationResult)
//! * [`classifier`] - The user-facing classifier with config and builder
//! * [`processors`] - Resize, normalization, and score post-processing
//! * [`utils`] - Image loading and conversion helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lesion_classifier::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut classifier = SkinLesionClassifierBuilder::new()
//!     .model_name("resnet50_lesion")
//!     .build(Path::new("models/resnet50_lesion.onnx"))?;
//!
//! let image = load_image(Path::new("photo.jpg"))?;
//! let result = classifier.classify(&image)?;
//! println!("{}: {:.1}%", result.class(), result.confidence());
//! for (class, score) in result.scores() {
//!     println!("  {class}: {score:.1}%");
//! }
//!
//! classifier.close();
//! # Ok(())
//! # }
//! ```
//!
//! One classifier instance serves one caller at a time: `classify` is
//! blocking and CPU-bound, so invoke it off any latency-sensitive thread and
//! use independent instances for concurrent callers.

pub mod classifier;
pub mod core;
pub mod domain;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use lesion_classifier::prelude::*;
/// ```
///
/// Included items cover the common path: the classifier and its builder,
/// the result types, the error type, and basic image loading. For advanced
/// customization (normalization parameters, the inference seam), import
/// directly from the respective modules.
pub mod prelude {
    pub use crate::classifier::{
        SkinLesionClassifier, SkinLesionClassifierBuilder, SkinLesionClassifierConfig,
    };
    pub use crate::core::{ClassifierError, ClassifyResult};
    pub use crate::domain::{ClassificationResult, LesionClass};
    pub use crate::utils::load_image;
}
