use std::path::Path;
use std::sync::Arc;

use log::info;

use super::classifier::{ArtifactSources, Classifier, OutputActivation};
use super::error::ClassifierError;
use super::labels::LabelEncoder;
use super::model::{OnnxSequenceModel, SequenceModel};
use super::sequence::SequenceConfig;
use super::tokenizer::{load_tokenizer, SequenceTokenizer};
use crate::artifacts::ArtifactStore;
use crate::runtime::RuntimeConfig;

/// A builder for constructing a Classifier with a fluent interface.
///
/// Each of the three artifacts (tokenizer, model, labels) is set exactly once,
/// either from a file or as a ready implementation.
#[derive(Default, Debug)]
pub struct ClassifierBuilder {
    tokenizer: Option<Arc<dyn SequenceTokenizer>>,
    model: Option<Arc<dyn SequenceModel>>,
    labels: Option<LabelEncoder>,
    sources: ArtifactSources,
    sequence_config: SequenceConfig,
    activation: OutputActivation,
    runtime_config: RuntimeConfig,
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use newsclass::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the runtime configuration for ONNX model execution.
    ///
    /// Must be called before the model is loaded to take effect.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    pub fn with_sequence_config(mut self, config: SequenceConfig) -> Self {
        self.sequence_config = config;
        self
    }

    /// Sets the fixed sequence length the model expects (300 by default).
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.sequence_config.max_len = max_len;
        self
    }

    pub fn with_output_activation(mut self, activation: OutputActivation) -> Self {
        self.activation = activation;
        self
    }

    /// Loads the tokenizer, model and labels from an artifact directory.
    ///
    /// # Example
    /// ```no_run
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use newsclass::{ArtifactStore, ClassifierBuilder};
    ///
    /// let classifier = ClassifierBuilder::new()
    ///     .with_max_len(300)
    ///     .with_artifacts(&ArtifactStore::new("artifacts")?)?
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_artifacts(self, store: &ArtifactStore) -> Result<Self, ClassifierError> {
        store.ensure_ready()?;
        info!("Loading artifacts from {}", store.dir().display());
        self.with_tokenizer_file(store.tokenizer_path())?
            .with_model_file(store.model_path())?
            .with_labels_file(store.labels_path())
    }

    pub fn with_tokenizer_file(mut self, path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let tokenizer = load_tokenizer(path)?;
        self.sources.tokenizer = Some(path_string(path));
        self.set_tokenizer(Arc::from(tokenizer))
    }

    pub fn with_model_file(mut self, path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        if self.model.is_some() {
            return Err(ClassifierError::Build("Model already set".into()));
        }
        let path = path.as_ref();
        let model = OnnxSequenceModel::load(path, &self.runtime_config)?;
        self.sources.model = Some(path_string(path));
        self.model = Some(Arc::new(model));
        Ok(self)
    }

    pub fn with_labels_file(mut self, path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let labels = LabelEncoder::from_file(path)?;
        self.sources.labels = Some(path_string(path));
        self.with_labels(labels)
    }

    /// Uses a ready tokenizer implementation.
    pub fn with_tokenizer(self, tokenizer: impl SequenceTokenizer + 'static) -> Result<Self, ClassifierError> {
        self.set_tokenizer(Arc::new(tokenizer))
    }

    /// Uses a ready model implementation.
    pub fn with_model(mut self, model: impl SequenceModel + 'static) -> Result<Self, ClassifierError> {
        if self.model.is_some() {
            return Err(ClassifierError::Build("Model already set".into()));
        }
        self.model = Some(Arc::new(model));
        Ok(self)
    }

    pub fn with_labels(mut self, labels: LabelEncoder) -> Result<Self, ClassifierError> {
        if self.labels.is_some() {
            return Err(ClassifierError::Build("Labels already set".into()));
        }
        self.labels = Some(labels);
        Ok(self)
    }

    fn set_tokenizer(mut self, tokenizer: Arc<dyn SequenceTokenizer>) -> Result<Self, ClassifierError> {
        if self.tokenizer.is_some() {
            return Err(ClassifierError::Build("Tokenizer already set".into()));
        }
        self.tokenizer = Some(tokenizer);
        Ok(self)
    }

    /// Builds and returns the final Classifier instance
    ///
    /// # Returns
    /// * `Result<Classifier, ClassifierError>` - The constructed Classifier if successful, or an error if:
    ///   - The tokenizer, model or labels are missing
    ///   - The sequence length is zero
    ///   - The model declares an input length different from the sequence length
    ///   - The model declares an output size different from the number of labels
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        let tokenizer = self
            .tokenizer
            .ok_or_else(|| ClassifierError::Build("No tokenizer loaded".into()))?;
        let model = self
            .model
            .ok_or_else(|| ClassifierError::Build("No model loaded".into()))?;
        let labels = self
            .labels
            .ok_or_else(|| ClassifierError::Build("No labels loaded".into()))?;

        self.sequence_config.validate()?;

        if let Some(input_len) = model.input_len() {
            if input_len != self.sequence_config.max_len {
                return Err(ClassifierError::Build(format!(
                    "Model expects sequences of length {}, but the classifier pads to {}",
                    input_len, self.sequence_config.max_len
                )));
            }
        }
        if let Some(output_size) = model.output_size() {
            if output_size != labels.len() {
                return Err(ClassifierError::Build(format!(
                    "Model scores {} categories, but {} labels were loaded",
                    output_size,
                    labels.len()
                )));
            }
        }

        info!(
            "Classifier ready: {} labels, sequence length {}, vocabulary {}",
            labels.len(),
            self.sequence_config.max_len,
            tokenizer.vocab_size()
        );

        Ok(Classifier {
            tokenizer,
            model,
            labels: Arc::new(labels),
            sequence_config: self.sequence_config,
            activation: self.activation,
            sources: self.sources,
        })
    }
}
