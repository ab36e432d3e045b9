//! A thread-safe news category classifier serving pre-trained sequence models.
//!
//! Three artifacts produced by an offline training run drive every prediction:
//! a tokenizer (text to vocabulary indices), a sequence model exported to ONNX
//! (fixed-length index sequence to one probability per category) and a label
//! file (category names in model output order). They are loaded once and
//! shared read-only.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use newsclass::{ArtifactStore, Classifier};
//!
//! let classifier = Classifier::builder()
//!     .with_artifacts(&ArtifactStore::new("artifacts")?)?
//!     .build()?;
//!
//! let prediction = classifier.predict("The striker scored twice as the club won the cup final")?;
//! println!("Predicted category: {} ({:.2}%)", prediction.label, prediction.confidence_percent());
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Artifacts
//!
//! Any tokenizer or model can be plugged in through [`SequenceTokenizer`] and
//! [`SequenceModel`]:
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::collections::HashMap;
//! use newsclass::{Classifier, LabelEncoder, SequenceModel, WordIndexTokenizer};
//!
//! #[derive(Debug)]
//! struct AlwaysSport;
//!
//! impl SequenceModel for AlwaysSport {
//!     fn predict(&self, _sequence: &[i64]) -> anyhow::Result<Vec<f32>> {
//!         Ok(vec![0.1, 0.9])
//!     }
//! }
//!
//! let classifier = Classifier::builder()
//!     .with_tokenizer(WordIndexTokenizer::new(HashMap::from([("goal".to_string(), 1)])))?
//!     .with_model(AlwaysSport)?
//!     .with_labels(LabelEncoder::new(vec!["business", "sport"])?)?
//!     .build()?;
//!
//! assert_eq!(classifier.predict("late goal")?.label, "sport");
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod classifier;
pub mod dataset;
mod runtime;

pub use artifacts::{ArtifactError, ArtifactStore, ARTIFACTS_ENV};
pub use classifier::{
    load_tokenizer, ArtifactKind, Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo, ConfidenceLevel,
    HfTokenizer, InputKind, LabelEncoder, OnnxSequenceModel, OutputActivation, Prediction, SequenceConfig,
    SequenceModel, SequenceTokenizer, Side, WordIndexTokenizer, DEFAULT_MAX_LEN,
};
pub use dataset::{Article, Dataset, DatasetError, DatasetSummary};
pub use runtime::{create_session_builder, RuntimeConfig};

pub fn init_logger() {
    env_logger::init();
}
