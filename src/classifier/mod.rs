//! Skin lesion classifier.
//!
//! This module provides the user-facing classifier that turns a decoded RGB
//! photo into a three-class probability distribution using the bundled
//! pre-trained model. The pipeline is: resize to the model's fixed square
//! input, Caffe-style BGR mean subtraction, one forward pass, argmax over the
//! three class scores.
//!
//! One classifier owns one loaded model. `classify` is blocking and CPU-bound;
//! callers run it off any latency-sensitive thread and serialize calls per
//! instance (or use independent instances per concurrent caller).

use crate::core::errors::SimpleError;
use crate::core::{
    ClassifierError, ClassifyResult, InferenceProvider, OrtInfer, Tensor2D,
};
use crate::domain::{ClassificationResult, LesionClass};
use crate::processors::{resize_to_square, NormalizeImage};
use image::imageops::FilterType;
use image::RgbImage;
use std::path::Path;
use tracing::debug;

/// Configuration for the skin lesion classifier.
#[derive(Debug, Clone)]
pub struct SkinLesionClassifierConfig {
    /// Name of the model, used in logs and error messages. Defaults to the
    /// model file stem (or "lesion_model" for in-memory models).
    pub model_name: Option<String>,
    /// Fixed square input edge length the model expects.
    pub input_size: u32,
    /// Interpolation filter used to resize inputs.
    pub resize_filter: FilterType,
}

impl Default for SkinLesionClassifierConfig {
    fn default() -> Self {
        Self {
            model_name: None,
            input_size: 224,
            resize_filter: FilterType::Triangle,
        }
    }
}

impl SkinLesionClassifierConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ClassifierError::ConfigError`] if the input size is zero.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.input_size == 0 {
            return Err(ClassifierError::config_error(
                "input_size must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Classifies skin lesion photos into `Non_Cancer` / `benign` / `malignant`.
///
/// The model is loaded once at construction and held for the classifier's
/// lifetime. [`close`](Self::close) releases it; after that, `classify` fails
/// fast with [`ClassifierError::Closed`].
pub struct SkinLesionClassifier {
    /// Inference engine; `None` once the classifier has been closed.
    infer: Option<Box<dyn InferenceProvider>>,
    /// Image normalizer applying the model's Caffe BGR preprocessing.
    normalize: NormalizeImage,
    /// Fixed square input edge length.
    input_size: u32,
    /// Interpolation filter used for resizing.
    resize_filter: FilterType,
    /// Name of the model being used.
    model_name: String,
}

impl std::fmt::Debug for SkinLesionClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkinLesionClassifier")
            .field("model_name", &self.model_name)
            .field("input_size", &self.input_size)
            .field("closed", &self.infer.is_none())
            .finish()
    }
}

impl SkinLesionClassifier {
    /// Creates a classifier by loading a model from a file.
    ///
    /// The model file is memory-mapped by the runtime and loaded eagerly;
    /// construction fails outright on a missing, corrupt, or incompatible
    /// artifact, leaving no partial instance.
    ///
    /// # Arguments
    ///
    /// * `config` - Classifier configuration
    /// * `model_path` - Path to the ONNX model file
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ModelLoad`] if the model cannot be loaded.
    pub fn new(
        config: SkinLesionClassifierConfig,
        model_path: &Path,
    ) -> Result<Self, ClassifierError> {
        config.validate()?;
        let infer = OrtInfer::new(model_path)?;
        let model_name = config
            .model_name
            .clone()
            .unwrap_or_else(|| infer.model_name().to_string());
        if let Some(shape) = infer.primary_input_shape() {
            debug!(model = %model_name, ?shape, "loaded lesion model");
        }
        Self::with_provider(config, Box::new(infer), model_name)
    }

    /// Creates a classifier from an in-memory model artifact, the loading
    /// path for models bundled into the binary.
    ///
    /// # Arguments
    ///
    /// * `config` - Classifier configuration
    /// * `model_bytes` - The raw bytes of the ONNX model
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ModelLoad`] if the model cannot be loaded.
    pub fn from_memory(
        config: SkinLesionClassifierConfig,
        model_bytes: &[u8],
    ) -> Result<Self, ClassifierError> {
        config.validate()?;
        let model_name = config
            .model_name
            .clone()
            .unwrap_or_else(|| "lesion_model".to_string());
        let infer = OrtInfer::from_memory(model_bytes, model_name.clone())?;
        Self::with_provider(config, Box::new(infer), model_name)
    }

    /// Creates a classifier over an arbitrary inference provider.
    ///
    /// This is the seam between the numeric pipeline and the runtime; tests
    /// substitute providers that return fixed scores.
    pub fn with_provider(
        config: SkinLesionClassifierConfig,
        provider: Box<dyn InferenceProvider>,
        model_name: String,
    ) -> Result<Self, ClassifierError> {
        config.validate()?;
        Ok(Self {
            infer: Some(provider),
            normalize: NormalizeImage::for_caffe_bgr()?,
            input_size: config.input_size,
            resize_filter: config.resize_filter,
            model_name,
        })
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.infer.is_none()
    }

    /// Classifies one lesion photo.
    ///
    /// The image is borrowed for the duration of the call and not retained.
    /// It may have arbitrary original dimensions; it is resized to the model's
    /// fixed input shape, normalized, and run through one forward pass.
    ///
    /// # Arguments
    ///
    /// * `image` - A decoded 8-bit RGB image
    ///
    /// # Returns
    ///
    /// A fully-populated [`ClassificationResult`], or an error. No partial or
    /// default result is ever produced.
    ///
    /// # Errors
    ///
    /// * [`ClassifierError::Closed`] if the classifier has been closed.
    /// * [`ClassifierError::Inference`] if the forward pass fails or the
    ///   model produces a malformed output.
    pub fn classify(&self, image: &RgbImage) -> ClassifyResult<ClassificationResult> {
        let infer = self.infer.as_ref().ok_or(ClassifierError::Closed)?;

        let resized = resize_to_square(image, self.input_size, self.resize_filter);
        let input = self.normalize.normalize_to(&resized)?;
        let output = infer.infer_2d(&input)?;
        let scores = self.extract_scores(&output)?;

        let result = ClassificationResult::from_scores(scores);
        debug!(
            model = %self.model_name,
            class = %result.class(),
            confidence = result.confidence(),
            "classified image"
        );
        Ok(result)
    }

    /// Validates the output tensor shape and extracts the three class scores.
    fn extract_scores(&self, output: &Tensor2D) -> ClassifyResult<[f32; 3]> {
        let expected = LesionClass::ALL.len();
        if output.nrows() != 1 || output.ncols() != expected {
            return Err(ClassifierError::inference_error(
                &self.model_name,
                &format!(
                    "expected output of shape [1, {expected}], got {:?}",
                    output.shape()
                ),
                SimpleError::new("unexpected output tensor shape"),
            ));
        }

        let row = output.row(0);
        Ok([row[0], row[1], row[2]])
    }

    /// Releases the held model resources.
    ///
    /// Subsequent `classify` calls fail with [`ClassifierError::Closed`].
    /// Calling `close` again is a no-op.
    pub fn close(&mut self) {
        match self.infer.take() {
            Some(_) => debug!(model = %self.model_name, "released model session"),
            None => debug!(model = %self.model_name, "close called on closed classifier"),
        }
    }
}

/// Builder for the skin lesion classifier.
#[derive(Debug, Default)]
pub struct SkinLesionClassifierBuilder {
    config: SkinLesionClassifierConfig,
}

impl SkinLesionClassifierBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: SkinLesionClassifierConfig::default(),
        }
    }

    /// Sets the model name used in logs and error messages.
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.config.model_name = Some(model_name.into());
        self
    }

    /// Sets the fixed square input edge length.
    pub fn input_size(mut self, input_size: u32) -> Self {
        self.config.input_size = input_size;
        self
    }

    /// Sets the interpolation filter used to resize inputs.
    pub fn resize_filter(mut self, filter: FilterType) -> Self {
        self.config.resize_filter = filter;
        self
    }

    /// Builds the classifier from a model file.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ModelLoad`] if the model cannot be loaded,
    /// or [`ClassifierError::ConfigError`] on an invalid configuration.
    pub fn build(self, model_path: &Path) -> Result<SkinLesionClassifier, ClassifierError> {
        SkinLesionClassifier::new(self.config, model_path)
    }

    /// Builds the classifier from an in-memory model artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ModelLoad`] if the model cannot be loaded,
    /// or [`ClassifierError::ConfigError`] on an invalid configuration.
    pub fn build_from_memory(
        self,
        model_bytes: &[u8],
    ) -> Result<SkinLesionClassifier, ClassifierError> {
        SkinLesionClassifier::from_memory(self.config, model_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Tensor4D;

    /// Provider returning fixed scores, recording the input shape it saw.
    struct FixedScores {
        scores: Vec<f32>,
        rows: usize,
    }

    impl FixedScores {
        fn single(scores: [f32; 3]) -> Self {
            Self {
                scores: scores.to_vec(),
                rows: 1,
            }
        }
    }

    impl InferenceProvider for FixedScores {
        fn infer_2d(&self, x: &Tensor4D) -> Result<Tensor2D, ClassifierError> {
            assert_eq!(x.shape()[0], 1, "expected single-image batch");
            let cols = self.scores.len() / self.rows;
            Ok(
                Tensor2D::from_shape_vec((self.rows, cols), self.scores.clone())
                    .expect("stub scores shape"),
            )
        }

        fn model_name(&self) -> &str {
            "stub_model"
        }
    }

    fn stub_classifier(scores: [f32; 3]) -> SkinLesionClassifier {
        SkinLesionClassifier::with_provider(
            SkinLesionClassifierConfig::default(),
            Box::new(FixedScores::single(scores)),
            "stub_model".to_string(),
        )
        .unwrap()
    }

    fn test_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        })
    }

    #[test]
    fn test_classify_reports_maximum_label() {
        let classifier = stub_classifier([4.1, 82.7, 13.2]);
        let result = classifier.classify(&test_image(640, 480)).unwrap();

        assert_eq!(result.class(), LesionClass::Benign);
        assert_eq!(result.confidence(), 82.7);
    }

    #[test]
    fn test_classify_scores_sum_to_one_hundred() {
        let classifier = stub_classifier([4.1, 82.7, 13.2]);
        let result = classifier.classify(&test_image(100, 300)).unwrap();

        let sum: f32 = result.scores().map(|(_, score)| score).sum();
        assert!((sum - 100.0).abs() < 0.5, "scores summed to {sum}");
    }

    #[test]
    fn test_classify_accepts_arbitrary_dimensions() {
        let classifier = stub_classifier([60.0, 30.0, 10.0]);
        for (w, h) in [(1, 1), (224, 224), (3000, 17)] {
            let result = classifier.classify(&test_image(w, h)).unwrap();
            assert_eq!(result.class(), LesionClass::NonCancer);
        }
    }

    #[test]
    fn test_classify_after_close_fails() {
        let mut classifier = stub_classifier([4.1, 82.7, 13.2]);
        classifier.close();

        assert!(classifier.is_closed());
        let result = classifier.classify(&test_image(224, 224));
        assert!(matches!(result, Err(ClassifierError::Closed)));
    }

    #[test]
    fn test_close_twice_is_safe() {
        let mut classifier = stub_classifier([4.1, 82.7, 13.2]);
        classifier.close();
        classifier.close();
        assert!(classifier.is_closed());
    }

    #[test]
    fn test_malformed_output_is_inference_error() {
        let classifier = SkinLesionClassifier::with_provider(
            SkinLesionClassifierConfig::default(),
            Box::new(FixedScores {
                scores: vec![1.0, 2.0, 3.0, 4.0],
                rows: 1,
            }),
            "stub_model".to_string(),
        )
        .unwrap();

        let result = classifier.classify(&test_image(224, 224));
        assert!(matches!(result, Err(ClassifierError::Inference { .. })));
    }

    #[test]
    fn test_zero_input_size_rejected() {
        let config = SkinLesionClassifierConfig {
            input_size: 0,
            ..Default::default()
        };
        let result = SkinLesionClassifier::with_provider(
            config,
            Box::new(FixedScores::single([1.0, 2.0, 3.0])),
            "stub_model".to_string(),
        );
        assert!(matches!(result, Err(ClassifierError::ConfigError { .. })));
    }

    #[test]
    fn test_missing_model_file_fails_at_construction() {
        let result = SkinLesionClassifierBuilder::new()
            .model_name("missing")
            .build(Path::new("no_such_model.onnx"));
        assert!(matches!(result, Err(ClassifierError::ModelLoad { .. })));
    }

    #[test]
    fn test_preprocess_idempotent_near_target_size() {
        // An image already at the model input size and a re-resized copy of
        // it must produce nearly identical input tensors.
        let normalize = NormalizeImage::for_caffe_bgr().unwrap();
        let at_size = test_image(224, 224);
        let re_resized = resize_to_square(&at_size, 224, FilterType::Triangle);

        let a = normalize.normalize_to(&at_size).unwrap();
        let b = normalize.normalize_to(&re_resized).unwrap();
        for (va, vb) in a.iter().zip(b.iter()) {
            assert!((va - vb).abs() <= 1.0, "tensor drifted by {}", (va - vb).abs());
        }
    }
}
