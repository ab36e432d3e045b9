use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::Context;
use log::{error, info};
use ndarray::Array2;
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{DynValue, Tensor, ValueType};

use super::error::{ArtifactKind, ClassifierError};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// A trained model mapping one fixed-length index sequence to one score per category.
pub trait SequenceModel: Send + Sync + fmt::Debug {
    /// Runs the model on a single already-normalized sequence.
    fn predict(&self, sequence: &[i64]) -> anyhow::Result<Vec<f32>>;

    /// Input length the model was exported with, when it declares one.
    fn input_len(&self) -> Option<usize> {
        None
    }

    /// Number of categories the model scores, when it declares it.
    fn output_size(&self) -> Option<usize> {
        None
    }
}

/// Element type of the model's sequence input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Int64,
    Int32,
    Float32,
}

/// A sequence classifier exported to ONNX and served by ONNX Runtime.
///
/// The first model input receives the `[1, L]` sequence and the first output
/// is read as `[1, C]` (or `[C]`) category scores.
#[derive(Debug)]
pub struct OnnxSequenceModel {
    session: Session,
    input_name: String,
    input_kind: InputKind,
    input_len: Option<usize>,
    output_size: Option<usize>,
}

fn positive(dim: Option<&i64>) -> Option<usize> {
    dim.and_then(|&d| if d > 0 { Some(d as usize) } else { None })
}

impl OnnxSequenceModel {
    pub fn load(path: impl AsRef<Path>, config: &RuntimeConfig) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::artifact(
                ArtifactKind::Model,
                format!("file not found: {}", path.display()),
            ));
        }

        let session = create_session_builder(config)?
            .commit_from_file(path)
            .map_err(|e| {
                error!("Failed to load model from {}: {}", path.display(), e);
                ClassifierError::artifact(ArtifactKind::Model, e)
            })?;

        let model = Self::from_session(session)?;
        info!(
            "Model loaded from {} (input '{}' {:?}, length {:?}, {:?} outputs)",
            path.display(),
            model.input_name,
            model.input_kind,
            model.input_len,
            model.output_size
        );
        Ok(model)
    }

    /// Wraps an already committed session after checking its signature.
    pub fn from_session(session: Session) -> Result<Self, ClassifierError> {
        Self::validate_model(&session)?;

        let input = &session.inputs[0];
        let (input_kind, input_len) = match &input.input_type {
            ValueType::Tensor { ty, dimensions, .. } => {
                let kind = match ty {
                    TensorElementType::Int64 => InputKind::Int64,
                    TensorElementType::Int32 => InputKind::Int32,
                    TensorElementType::Float32 => InputKind::Float32,
                    other => {
                        return Err(ClassifierError::artifact(
                            ArtifactKind::Model,
                            format!("unsupported input element type {:?}", other),
                        ))
                    }
                };
                (kind, positive(dimensions.get(1)))
            }
            other => {
                return Err(ClassifierError::artifact(
                    ArtifactKind::Model,
                    format!("input '{}' is not a tensor: {:?}", input.name, other),
                ))
            }
        };

        let output_size = match &session.outputs[0].output_type {
            ValueType::Tensor { dimensions, .. } => positive(dimensions.last()),
            _ => None,
        };

        Ok(Self {
            input_name: input.name.clone(),
            input_kind,
            input_len,
            output_size,
            session,
        })
    }

    pub fn input_kind(&self) -> InputKind {
        self.input_kind
    }

    /// Checks the model has a sequence input and a score output.
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        if session.inputs.is_empty() {
            return Err(ClassifierError::artifact(
                ArtifactKind::Model,
                "model must have at least 1 input for the token sequence",
            ));
        }
        if session.outputs.is_empty() {
            return Err(ClassifierError::artifact(
                ArtifactKind::Model,
                "model must have at least 1 output for category scores",
            ));
        }
        Ok(())
    }

    fn input_tensor(&self, sequence: &[i64]) -> anyhow::Result<DynValue> {
        let shape = (1, sequence.len());
        let value = match self.input_kind {
            InputKind::Int64 => Tensor::from_array(Array2::from_shape_vec(shape, sequence.to_vec())?)?.into_dyn(),
            InputKind::Int32 => {
                let ids = sequence
                    .iter()
                    .map(|&id| i32::try_from(id))
                    .collect::<Result<Vec<_>, _>>()
                    .context("token index does not fit the model's int32 input")?;
                Tensor::from_array(Array2::from_shape_vec(shape, ids)?)?.into_dyn()
            }
            InputKind::Float32 => {
                let ids = sequence.iter().map(|&id| id as f32).collect();
                Tensor::from_array(Array2::from_shape_vec(shape, ids)?)?.into_dyn()
            }
        };
        Ok(value)
    }
}

impl SequenceModel for OnnxSequenceModel {
    fn predict(&self, sequence: &[i64]) -> anyhow::Result<Vec<f32>> {
        let mut inputs = HashMap::new();
        inputs.insert(self.input_name.as_str(), self.input_tensor(sequence)?);

        let outputs = self.session.run(inputs).context("failed to run model")?;
        let scores = outputs[0]
            .try_extract_tensor::<f32>()
            .context("failed to extract output tensor")?;

        let shape = scores.shape();
        anyhow::ensure!(
            shape.len() == 1 || (shape.len() == 2 && shape[0] == 1),
            "unexpected output shape {:?}, expected [1, C] or [C]",
            shape
        );
        Ok(scores.iter().copied().collect())
    }

    fn input_len(&self) -> Option<usize> {
        self.input_len
    }

    fn output_size(&self) -> Option<usize> {
        self.output_size
    }
}
