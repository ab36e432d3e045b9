use std::sync::{Arc, OnceLock};

use log::{debug, error, warn};
use serde::Serialize;

use super::error::ClassifierError;
use super::labels::LabelEncoder;
use super::model::SequenceModel;
use super::prediction::Prediction;
use super::sequence::SequenceConfig;
use super::tokenizer::SequenceTokenizer;
use super::utils::{argmax, distribution_violation, softmax};

static SHARED: OnceLock<Classifier> = OnceLock::new();

/// What the model's output layer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputActivation {
    /// Already a probability distribution (softmax output layer)
    #[default]
    Probabilities,
    /// Raw scores; softmax is applied before picking a label
    Logits,
}

/// Where each loaded artifact came from, when it came from a file.
#[derive(Debug, Clone, Default)]
pub(crate) struct ArtifactSources {
    pub tokenizer: Option<String>,
    pub model: Option<String>,
    pub labels: Option<String>,
}

/// A thread-safe news category classifier over pre-trained artifacts.
///
/// # Thread Safety
///
/// All artifacts sit behind `Arc` and are never mutated after `build()`, so a
/// classifier can be shared across threads and used concurrently without locks.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use newsclass::{ArtifactStore, Classifier};
/// use std::sync::Arc;
/// use std::thread;
///
/// let classifier = Arc::new(
///     Classifier::builder()
///         .with_artifacts(&ArtifactStore::new_default()?)?
///         .build()?,
/// );
///
/// let classifier_clone = Arc::clone(&classifier);
/// thread::spawn(move || {
///     classifier_clone.predict("Shares rose after strong quarterly results").unwrap();
/// });
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Classifier {
    pub(crate) tokenizer: Arc<dyn SequenceTokenizer>,
    pub(crate) model: Arc<dyn SequenceModel>,
    pub(crate) labels: Arc<LabelEncoder>,
    pub(crate) sequence_config: SequenceConfig,
    pub(crate) activation: OutputActivation,
    pub(crate) sources: ArtifactSources,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            model_path: self.sources.model.clone(),
            tokenizer_path: self.sources.tokenizer.clone(),
            labels_path: self.sources.labels.clone(),
            num_classes: self.labels.len(),
            class_labels: self.labels.classes().to_vec(),
            vocab_size: self.tokenizer.vocab_size(),
            sequence_config: self.sequence_config,
            activation: self.activation,
        }
    }

    pub fn labels(&self) -> &[String] {
        self.labels.classes()
    }

    pub fn sequence_config(&self) -> &SequenceConfig {
        &self.sequence_config
    }

    /// Converts text into vocabulary indices without padding.
    pub fn tokenize(&self, text: &str) -> Result<Vec<u32>, ClassifierError> {
        self.tokenizer
            .text_to_sequence(text)
            .map_err(|e| ClassifierError::prediction("tokenization", e))
    }

    /// Counts the vocabulary indices the text produces before padding or truncation.
    pub fn count_tokens(&self, text: &str) -> Result<usize, ClassifierError> {
        self.tokenize(text).map(|tokens| tokens.len())
    }

    /// Tokenizes and normalizes text to the model's fixed input length.
    pub fn encode(&self, text: &str) -> Result<Vec<i64>, ClassifierError> {
        let tokens = self.tokenize(text)?;
        if tokens.is_empty() {
            warn!("Input has no known words; classifying an all-padding sequence");
        }
        Ok(self.sequence_config.normalize(&tokens))
    }

    /// Predicts the category of the input text.
    ///
    /// # Returns
    /// A [`Prediction`] with the winning label, its probability and the full
    /// distribution over every known label.
    ///
    /// # Errors
    /// * `Validation` if the text is empty or whitespace only
    /// * `Prediction` if tokenization or the model fails, or the model output
    ///   is not a distribution over the label set
    pub fn predict(&self, text: &str) -> Result<Prediction, ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::Validation("Input text cannot be empty".into()));
        }

        let sequence = self.encode(text)?;
        let raw = self
            .model
            .predict(&sequence)
            .map_err(|e| ClassifierError::prediction("model invocation", e))?;

        let prediction = self.interpret(raw)?;
        debug!("Predicted {}", prediction);
        Ok(prediction)
    }

    /// Classifies each text independently; one failure does not affect the rest.
    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<Result<Prediction, ClassifierError>> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                self.predict(text.as_ref()).map_err(|e| {
                    error!("Request {} failed: {}", i + 1, e);
                    e
                })
            })
            .collect()
    }

    fn interpret(&self, raw: Vec<f32>) -> Result<Prediction, ClassifierError> {
        if raw.len() != self.labels.len() {
            return Err(ClassifierError::Prediction(format!(
                "model returned {} scores for {} labels",
                raw.len(),
                self.labels.len()
            )));
        }

        let probabilities = match self.activation {
            OutputActivation::Probabilities => raw,
            OutputActivation::Logits => {
                if let Some(pos) = raw.iter().position(|v| !v.is_finite()) {
                    return Err(ClassifierError::Prediction(format!(
                        "non-finite logit {} at index {}",
                        raw[pos], pos
                    )));
                }
                softmax(&raw)
            }
        };

        if let Some(violation) = distribution_violation(&probabilities) {
            return Err(ClassifierError::Prediction(format!(
                "model output is not a probability distribution: {}",
                violation
            )));
        }

        let index = argmax(&probabilities)
            .ok_or_else(|| ClassifierError::Prediction("model output has no maximum".into()))?;
        let label = self
            .labels
            .inverse_transform(index)
            .ok_or_else(|| ClassifierError::Prediction(format!("no label for output index {}", index)))?
            .to_string();

        let scores = self
            .labels
            .classes()
            .iter()
            .cloned()
            .zip(probabilities.iter().copied())
            .collect();

        Ok(Prediction {
            label,
            index,
            confidence: probabilities[index],
            scores,
        })
    }

    /// Makes this classifier the process-wide instance. Only the first call succeeds.
    pub fn install(self) -> Result<&'static Classifier, ClassifierError> {
        SHARED
            .set(self)
            .map_err(|_| ClassifierError::Build("A shared classifier is already installed".into()))?;
        SHARED
            .get()
            .ok_or_else(|| ClassifierError::Build("Shared classifier is not available".into()))
    }

    /// The process-wide instance, once [`Classifier::install`] has run.
    pub fn shared() -> Option<&'static Classifier> {
        SHARED.get()
    }
}
