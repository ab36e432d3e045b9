use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use tokenizers::Tokenizer;

use super::error::{ArtifactKind, ClassifierError};

/// Characters a word-index tokenizer strips by default.
pub const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Maps raw text to a sequence of vocabulary indices.
///
/// Implementations own their out-of-vocabulary policy: unknown words may be
/// dropped or mapped to a reserved index, but the classifier never second
/// guesses the result.
pub trait SequenceTokenizer: Send + Sync + fmt::Debug {
    /// Converts `text` into vocabulary indices, in reading order.
    fn text_to_sequence(&self, text: &str) -> anyhow::Result<Vec<u32>>;

    /// Number of distinct indices the tokenizer can emit, including reserved ones.
    fn vocab_size(&self) -> usize;
}

/// A word-level tokenizer driven by a fixed `word -> index` table.
///
/// Loads the JSON written by a Keras `Tokenizer.to_json()` call, which is how
/// the news model's vocabulary is shipped.
#[derive(Debug, Clone)]
pub struct WordIndexTokenizer {
    word_index: HashMap<String, u32>,
    num_words: Option<usize>,
    oov_token: Option<String>,
    filters: String,
    lower: bool,
    split: String,
    char_level: bool,
}

#[derive(Debug, Deserialize)]
struct TokenizerExport {
    config: TokenizerExportConfig,
}

fn default_filters() -> Option<String> {
    Some(DEFAULT_FILTERS.to_string())
}

fn default_true() -> bool {
    true
}

fn default_split() -> String {
    " ".to_string()
}

#[derive(Debug, Deserialize)]
struct TokenizerExportConfig {
    #[serde(default)]
    num_words: Option<usize>,
    #[serde(default = "default_filters")]
    filters: Option<String>,
    #[serde(default = "default_true")]
    lower: bool,
    #[serde(default = "default_split")]
    split: String,
    #[serde(default)]
    char_level: bool,
    #[serde(default)]
    oov_token: Option<String>,
    word_index: Value,
}

impl WordIndexTokenizer {
    /// Creates a tokenizer with the default lower-casing, filters and space splitting.
    pub fn new(word_index: HashMap<String, u32>) -> Self {
        Self {
            word_index,
            num_words: None,
            oov_token: None,
            filters: DEFAULT_FILTERS.to_string(),
            lower: true,
            split: default_split(),
            char_level: false,
        }
    }

    /// Keeps only indices below `num_words`; larger ones follow the OOV policy.
    pub fn with_num_words(mut self, num_words: usize) -> Self {
        self.num_words = Some(num_words);
        self
    }

    /// Maps unknown words to the index of `token`, which must be in the vocabulary.
    pub fn with_oov_token(mut self, token: impl Into<String>) -> Self {
        self.oov_token = Some(token.into());
        self
    }

    pub fn with_filters(mut self, filters: impl Into<String>) -> Self {
        self.filters = filters.into();
        self
    }

    pub fn with_lower(mut self, lower: bool) -> Self {
        self.lower = lower;
        self
    }

    pub fn with_split(mut self, split: impl Into<String>) -> Self {
        self.split = split.into();
        self
    }

    pub fn with_char_level(mut self, char_level: bool) -> Self {
        self.char_level = char_level;
        self
    }

    /// Parses a tokenizer export. `word_index` may be inline or JSON-encoded as a string.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let export: TokenizerExport = serde_json::from_str(json).context("invalid tokenizer export")?;
        let config = export.config;

        let word_index: HashMap<String, u32> = match config.word_index {
            Value::String(encoded) => serde_json::from_str(&encoded).context("invalid encoded word_index")?,
            other => serde_json::from_value(other).context("invalid word_index")?,
        };
        anyhow::ensure!(!word_index.is_empty(), "word_index is empty");
        anyhow::ensure!(!config.split.is_empty() || config.char_level, "split separator is empty");

        let tokenizer = Self {
            word_index,
            num_words: config.num_words,
            oov_token: config.oov_token,
            filters: config.filters.unwrap_or_default(),
            lower: config.lower,
            split: config.split,
            char_level: config.char_level,
        };
        debug!(
            "Word-index tokenizer: {} words, num_words={:?}, oov={:?}",
            tokenizer.word_index.len(),
            tokenizer.num_words,
            tokenizer.oov_token
        );
        Ok(tokenizer)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
        Self::from_json(&json)
    }

    fn oov_index(&self) -> Option<u32> {
        self.oov_token.as_ref().and_then(|token| self.word_index.get(token).copied())
    }

    fn words(&self, text: &str) -> Vec<String> {
        let text = if self.lower { text.to_lowercase() } else { text.to_string() };
        if self.char_level {
            return text.chars().map(String::from).collect();
        }
        let translated: String = text
            .chars()
            .flat_map(|c| {
                if self.filters.contains(c) {
                    self.split.chars().collect::<Vec<_>>()
                } else {
                    vec![c]
                }
            })
            .collect();
        translated
            .split(self.split.as_str())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl SequenceTokenizer for WordIndexTokenizer {
    fn text_to_sequence(&self, text: &str) -> anyhow::Result<Vec<u32>> {
        let oov = self.oov_index();
        let sequence = self
            .words(text)
            .iter()
            .filter_map(|word| match self.word_index.get(word) {
                Some(&index) => match self.num_words.filter(|&n| n > 0) {
                    Some(limit) if index as usize >= limit => oov,
                    _ => Some(index),
                },
                None => oov,
            })
            .collect();
        Ok(sequence)
    }

    fn vocab_size(&self) -> usize {
        self.num_words.filter(|&n| n > 0).unwrap_or(self.word_index.len() + 1)
    }
}

/// A Hugging Face `tokenizer.json`. Its own padding and truncation are turned
/// off so the classifier alone decides how sequences reach the model's input length.
#[derive(Debug)]
pub struct HfTokenizer {
    inner: Tokenizer,
}

impl HfTokenizer {
    pub fn new(mut inner: Tokenizer) -> anyhow::Result<Self> {
        inner.with_padding(None);
        inner
            .with_truncation(None)
            .map_err(|e| anyhow::anyhow!("disable truncation: {e}"))?;
        Ok(Self { inner })
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let inner = Tokenizer::from_file(path).map_err(|e| anyhow::anyhow!("load {}: {e}", path.display()))?;
        Self::new(inner)
    }
}

impl SequenceTokenizer for HfTokenizer {
    fn text_to_sequence(&self, text: &str) -> anyhow::Result<Vec<u32>> {
        let encoding = self.inner.encode(text, false).map_err(|e| anyhow::anyhow!("encode: {e}"))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }
}

fn is_word_index_export(value: &Value) -> bool {
    value.get("config").and_then(|config| config.get("word_index")).is_some()
}

/// Loads a tokenizer artifact, detecting its format from the file contents.
pub fn load_tokenizer(path: impl AsRef<Path>) -> Result<Box<dyn SequenceTokenizer>, ClassifierError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ClassifierError::artifact(
            ArtifactKind::Tokenizer,
            format!("file not found: {}", path.display()),
        ));
    }
    let contents = fs::read_to_string(path).map_err(|e| ClassifierError::artifact(ArtifactKind::Tokenizer, e))?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| ClassifierError::artifact(ArtifactKind::Tokenizer, format!("not valid JSON: {}", e)))?;

    let tokenizer: Box<dyn SequenceTokenizer> = if is_word_index_export(&value) {
        let tokenizer = WordIndexTokenizer::from_json(&contents)
            .map_err(|e| ClassifierError::artifact(ArtifactKind::Tokenizer, format!("{:#}", e)))?;
        info!("Loaded word-index tokenizer from {}", path.display());
        Box::new(tokenizer)
    } else {
        let inner = Tokenizer::from_str(&contents)
            .map_err(|e| ClassifierError::artifact(ArtifactKind::Tokenizer, e))?;
        let tokenizer = HfTokenizer::new(inner)
            .map_err(|e| ClassifierError::artifact(ArtifactKind::Tokenizer, format!("{:#}", e)))?;
        info!("Loaded Hugging Face tokenizer from {}", path.display());
        Box::new(tokenizer)
    };
    Ok(tokenizer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(words: &[&str]) -> HashMap<String, u32> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.to_string(), i as u32 + 1))
            .collect()
    }

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        let tokenizer = WordIndexTokenizer::new(vocab(&["the", "match", "ended"]));
        let seq = tokenizer.text_to_sequence("The match, ENDED!").unwrap();
        assert_eq!(seq, vec![1, 2, 3]);
    }

    #[test]
    fn test_unknown_words_are_dropped_without_oov() {
        let tokenizer = WordIndexTokenizer::new(vocab(&["goal"]));
        assert_eq!(tokenizer.text_to_sequence("a late goal").unwrap(), vec![1]);
        assert!(tokenizer.text_to_sequence("nothing known").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_words_map_to_oov() {
        let tokenizer = WordIndexTokenizer::new(vocab(&["<OOV>", "goal"])).with_oov_token("<OOV>");
        assert_eq!(tokenizer.text_to_sequence("late goal").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_num_words_limit() {
        let words = vocab(&["<OOV>", "goal", "rare"]);
        let tokenizer = WordIndexTokenizer::new(words.clone()).with_num_words(3);
        assert_eq!(tokenizer.text_to_sequence("rare goal").unwrap(), vec![2]);

        let tokenizer = WordIndexTokenizer::new(words).with_num_words(3).with_oov_token("<OOV>");
        assert_eq!(tokenizer.text_to_sequence("rare goal").unwrap(), vec![1, 2]);
        assert_eq!(tokenizer.vocab_size(), 3);
    }

    #[test]
    fn test_zero_num_words_means_no_limit() {
        let tokenizer = WordIndexTokenizer::new(vocab(&["goal", "rare"])).with_num_words(0);
        assert_eq!(tokenizer.text_to_sequence("rare goal").unwrap(), vec![2, 1]);
        assert_eq!(tokenizer.vocab_size(), 3);
    }

    #[test]
    fn test_char_level() {
        let tokenizer = WordIndexTokenizer::new(vocab(&["a", "b"])).with_char_level(true);
        assert_eq!(tokenizer.text_to_sequence("AbA").unwrap(), vec![1, 2, 1]);
    }

    #[test]
    fn test_from_json_with_encoded_word_index() {
        let json = r##"{
            "class_name": "Tokenizer",
            "config": {
                "num_words": null,
                "filters": "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n",
                "lower": true,
                "split": " ",
                "char_level": false,
                "oov_token": "<OOV>",
                "document_count": 2,
                "word_index": "{\"<OOV>\": 1, \"market\": 2, \"shares\": 3}"
            }
        }"##;
        let tokenizer = WordIndexTokenizer::from_json(json).unwrap();
        assert_eq!(tokenizer.text_to_sequence("Shares, market; bonds").unwrap(), vec![3, 2, 1]);
        assert_eq!(tokenizer.vocab_size(), 4);
    }

    #[test]
    fn test_from_json_with_inline_word_index() {
        let json = r#"{"config": {"word_index": {"vote": 1}}}"#;
        let tokenizer = WordIndexTokenizer::from_json(json).unwrap();
        assert_eq!(tokenizer.text_to_sequence("Vote!").unwrap(), vec![1]);
    }

    #[test]
    fn test_from_json_rejects_empty_vocabulary() {
        assert!(WordIndexTokenizer::from_json(r#"{"config": {"word_index": {}}}"#).is_err());
        assert!(WordIndexTokenizer::from_json("[]").is_err());
    }

    #[test]
    fn test_load_tokenizer_missing_file() {
        let err = load_tokenizer("/definitely/not/here/tokenizer.json").unwrap_err();
        assert!(matches!(err, ClassifierError::ArtifactLoad { artifact: ArtifactKind::Tokenizer, .. }));
    }

    #[test]
    fn test_load_tokenizer_detects_word_index_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        fs::write(&path, r#"{"config": {"word_index": {"film": 1, "award": 2}}}"#).unwrap();

        let tokenizer = load_tokenizer(&path).unwrap();
        assert_eq!(tokenizer.text_to_sequence("award film").unwrap(), vec![2, 1]);
    }

    // Right-side truncation to 4 tokens, as many exported tokenizers carry.
    const WORD_LEVEL_JSON: &str = r#"{
        "version": "1.0",
        "truncation": {"direction": "Right", "max_length": 4, "strategy": "LongestFirst", "stride": 0},
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {"[UNK]": 0, "a": 1, "b": 2, "c": 3, "d": 4, "e": 5, "f": 6},
            "unk_token": "[UNK]"
        }
    }"#;

    #[test]
    fn test_load_tokenizer_detects_hugging_face_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        fs::write(&path, WORD_LEVEL_JSON).unwrap();

        let tokenizer = load_tokenizer(&path).unwrap();
        assert_eq!(tokenizer.text_to_sequence("b a z").unwrap(), vec![2, 1, 0]);
        assert_eq!(tokenizer.vocab_size(), 7);
    }

    #[test]
    fn test_hugging_face_truncation_is_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        fs::write(&path, WORD_LEVEL_JSON).unwrap();

        let tokenizer = load_tokenizer(&path).unwrap();
        assert_eq!(tokenizer.text_to_sequence("a b c d e f").unwrap(), vec![1, 2, 3, 4, 5, 6]);

        let tokenizer = HfTokenizer::from_file(&path).unwrap();
        assert_eq!(tokenizer.text_to_sequence("f e d c b a").unwrap().len(), 6);
    }

    #[test]
    fn test_load_tokenizer_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        fs::write(&path, "\u{0}corrupt").unwrap();
        assert!(load_tokenizer(&path).is_err());
    }
}
