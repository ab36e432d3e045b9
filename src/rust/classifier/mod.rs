mod builder;
#[allow(clippy::module_inception)]
mod classifier;
mod error;
mod labels;
mod model;
mod prediction;
mod sequence;
mod tokenizer;
mod utils;

use serde::Serialize;

pub use builder::ClassifierBuilder;
pub use classifier::{Classifier, OutputActivation};
pub use error::{ArtifactKind, ClassifierError};
pub use labels::LabelEncoder;
pub use model::{InputKind, OnnxSequenceModel, SequenceModel};
pub use prediction::{ConfidenceLevel, Prediction};
pub use sequence::{SequenceConfig, Side, DEFAULT_MAX_LEN};
pub use tokenizer::{load_tokenizer, HfTokenizer, SequenceTokenizer, WordIndexTokenizer, DEFAULT_FILTERS};

/// A snapshot of a classifier's configuration and loaded artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierInfo {
    pub model_path: Option<String>,
    pub tokenizer_path: Option<String>,
    pub labels_path: Option<String>,
    pub num_classes: usize,
    pub class_labels: Vec<String>,
    pub vocab_size: usize,
    pub sequence_config: SequenceConfig,
    pub activation: OutputActivation,
}
