use ort::Error as OrtError;
use std::fmt;

/// The artifact a load failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Tokenizer,
    Model,
    Labels,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [ArtifactKind::Model, ArtifactKind::Tokenizer, ArtifactKind::Labels];

    /// Standard file name inside an artifact directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Tokenizer => "tokenizer.json",
            Self::Model => "model.onnx",
            Self::Labels => "labels.json",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tokenizer => write!(f, "tokenizer"),
            Self::Model => write!(f, "model"),
            Self::Labels => write!(f, "labels"),
        }
    }
}

/// Represents the different types of errors that can occur in the text classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// A required artifact is missing or could not be parsed
    #[error("Failed to load {artifact}: {reason}")]
    ArtifactLoad { artifact: ArtifactKind, reason: String },
    /// The builder is incomplete or its artifacts disagree with each other
    #[error("Build error: {0}")]
    Build(String),
    /// Tokenization, model invocation or output checking failed for one request
    #[error("Prediction failed: {0}")]
    Prediction(String),
    /// Invalid input or configuration
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ClassifierError {
    pub(crate) fn artifact(artifact: ArtifactKind, reason: impl fmt::Display) -> Self {
        Self::ArtifactLoad { artifact, reason: reason.to_string() }
    }

    /// Wraps a capability failure, keeping the whole cause chain in the message.
    pub(crate) fn prediction(stage: &str, cause: anyhow::Error) -> Self {
        Self::Prediction(format!("{}: {:#}", stage, cause))
    }
}

impl From<OrtError> for ClassifierError {
    fn from(err: OrtError) -> Self {
        ClassifierError::Build(err.to_string())
    }
}
