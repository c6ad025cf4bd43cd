//! ONNX Runtime inference engine for the lesion model.
//!
//! This module wraps a single ONNX Runtime session behind the
//! [`InferenceProvider`] trait so the classifier stays agnostic of the
//! runtime. The session is held behind a `Mutex`; one forward pass runs at a
//! time per engine, matching the single-in-flight contract of the classifier.

use crate::core::errors::{ClassifierError, SimpleError};
use crate::core::{Tensor2D, Tensor4D};
use ndarray::ArrayView2;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::{TensorRef, ValueType};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A forward-inference entry point producing class scores.
///
/// Implemented by [`OrtInfer`] for the bundled ONNX model; test code can
/// substitute a stub returning fixed scores.
pub trait InferenceProvider: Send {
    /// Runs one forward pass over a single-image input tensor and returns the
    /// `(batch, classes)` output scores.
    fn infer_2d(&self, x: &Tensor4D) -> Result<Tensor2D, ClassifierError>;

    /// Returns the name of the model backing this provider.
    fn model_name(&self) -> &str;
}

/// ONNX Runtime inference engine holding one loaded session.
///
/// The model artifact is loaded eagerly at construction; file-based models are
/// memory-mapped by the runtime. The engine is immutable after construction
/// and never reloads.
pub struct OrtInfer {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    model_path: Option<PathBuf>,
    model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Creates a new OrtInfer instance from a model file.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the ONNX model file.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ModelLoad`] if the file is missing, corrupt,
    /// or incompatible with the runtime.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = model_path.as_ref();
        let session = Session::builder()?
            .with_log_level(LogLevel::Error)?
            .commit_from_file(path)
            .map_err(|e| {
                ClassifierError::model_load_error(
                    path,
                    "failed to create ONNX session",
                    Some(e),
                )
            })?;
        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        Self::from_session(session, Some(path.to_path_buf()), model_name)
    }

    /// Creates a new OrtInfer instance from an in-memory model artifact.
    ///
    /// This is the loading path for models bundled into the binary
    /// (e.g. via `include_bytes!`).
    ///
    /// # Arguments
    ///
    /// * `model_bytes` - The raw bytes of the ONNX model.
    /// * `model_name` - Name used in logs and error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ModelLoad`] if the bytes are corrupt or
    /// incompatible with the runtime.
    pub fn from_memory(
        model_bytes: &[u8],
        model_name: impl Into<String>,
    ) -> Result<Self, ClassifierError> {
        let model_name = model_name.into();
        let session = Session::builder()?
            .with_log_level(LogLevel::Error)?
            .commit_from_memory(model_bytes)
            .map_err(|e| {
                ClassifierError::model_load_from_memory_error(
                    &model_name,
                    "failed to create ONNX session",
                    Some(e),
                )
            })?;

        Self::from_session(session, None, model_name)
    }

    /// Finishes construction by discovering the input and output tensor names
    /// from the session metadata.
    fn from_session(
        session: Session,
        model_path: Option<PathBuf>,
        model_name: String,
    ) -> Result<Self, ClassifierError> {
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                ClassifierError::model_load_from_memory_error(
                    &model_name,
                    "model declares no inputs",
                    None::<SimpleError>,
                )
            })?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                ClassifierError::model_load_from_memory_error(
                    &model_name,
                    "model declares no outputs",
                    None::<SimpleError>,
                )
            })?;

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            model_path,
            model_name,
        })
    }

    /// Returns the model path associated with this inference engine, if the
    /// model was loaded from a file.
    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    /// Attempts to retrieve the primary input tensor shape from the session.
    ///
    /// Returns a vector of dimensions if available. Dynamic dimensions (e.g., -1)
    /// are returned as-is.
    pub fn primary_input_shape(&self) -> Option<Vec<i64>> {
        let session_guard = self.session.lock().ok()?;
        let input = session_guard.inputs.first()?;
        match &input.input_type {
            ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
            _ => None,
        }
    }
}

impl InferenceProvider for OrtInfer {
    fn infer_2d(&self, x: &Tensor4D) -> Result<Tensor2D, ClassifierError> {
        let input_shape = x.shape().to_vec();

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            ClassifierError::inference_error(
                &self.model_name,
                &format!("failed to convert input tensor with shape {input_shape:?}"),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session_guard = self.session.lock().map_err(|_| {
            ClassifierError::inference_error(
                &self.model_name,
                "failed to acquire session lock",
                SimpleError::new("session lock poisoned"),
            )
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            ClassifierError::inference_error(
                &self.model_name,
                &format!(
                    "forward pass failed with input '{}' -> output '{}'",
                    self.input_name, self.output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                ClassifierError::inference_error(
                    &self.model_name,
                    &format!("failed to extract output tensor '{}' as f32", self.output_name),
                    e,
                )
            })?;

        if output_shape.len() != 2 {
            return Err(ClassifierError::inference_error(
                &self.model_name,
                &format!(
                    "expected 2D output tensor, got {}D with shape {:?}",
                    output_shape.len(),
                    output_shape
                ),
                SimpleError::new("invalid output tensor dimensions"),
            ));
        }

        let batch_size = output_shape[0] as usize;
        let num_classes = output_shape[1] as usize;
        if output_data.len() != batch_size * num_classes {
            return Err(ClassifierError::inference_error(
                &self.model_name,
                &format!(
                    "output data size mismatch: expected {}, got {}",
                    batch_size * num_classes,
                    output_data.len()
                ),
                SimpleError::new("output tensor data size mismatch"),
            ));
        }

        let array_view = ArrayView2::from_shape((batch_size, num_classes), output_data)
            .map_err(ClassifierError::Tensor)?;
        Ok(array_view.to_owned())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_missing_model_fails() {
        let result = OrtInfer::new("does_not_exist.onnx");
        assert!(matches!(result, Err(ClassifierError::ModelLoad { .. })));
    }

    #[test]
    fn test_from_memory_with_corrupt_model_fails() {
        let result = OrtInfer::from_memory(b"not an onnx model", "corrupt");
        assert!(matches!(result, Err(ClassifierError::ModelLoad { .. })));
    }
}
