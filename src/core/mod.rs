//! The core module of the classification pipeline.
//!
//! This module contains the fundamental components of the pipeline:
//! - Error handling
//! - Inference engine integration
//! - Tensor aliases shared between processors and the inference engine
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod errors;
pub mod inference;

pub use errors::{ClassifierError, ClassifyResult, ProcessingStage};
pub use inference::{InferenceProvider, OrtInfer};

/// A 2D tensor of `(batch, classes)` scores.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4D single-image input tensor in `(batch, height, width, channels)` or
/// `(batch, channels, height, width)` layout depending on the normalizer.
pub type Tensor4D = ndarray::Array4<f32>;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application to
/// enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
