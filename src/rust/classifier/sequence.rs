//! Fixed-length normalization of token sequences.
//!
//! Models trained on padded batches expect every input to have exactly the
//! length they were trained with. Longer sequences are cut and shorter ones
//! are filled with a sentinel value, on the side chosen by [`Side`].

use serde::{Deserialize, Serialize};

use super::error::ClassifierError;

/// Sequence length the bundled news model was trained with.
pub const DEFAULT_MAX_LEN: usize = 300;

/// Which end of a sequence padding is added to, or truncation removes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The start of the sequence
    #[default]
    Pre,
    /// The end of the sequence
    Post,
}

/// How token sequences are brought to the model's fixed input length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceConfig {
    pub max_len: usize,
    pub padding: Side,
    pub truncating: Side,
    pub pad_value: i64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            padding: Side::Pre,
            truncating: Side::Pre,
            pad_value: 0,
        }
    }
}

impl SequenceConfig {
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.max_len == 0 {
            return Err(ClassifierError::Validation("Sequence length must be greater than zero".into()));
        }
        Ok(())
    }

    /// Pads or truncates `tokens` to exactly `max_len` items.
    pub fn normalize(&self, tokens: &[u32]) -> Vec<i64> {
        let kept = if tokens.len() > self.max_len {
            match self.truncating {
                Side::Pre => &tokens[tokens.len() - self.max_len..],
                Side::Post => &tokens[..self.max_len],
            }
        } else {
            tokens
        };

        let fill = self.max_len - kept.len();
        let mut sequence = Vec::with_capacity(self.max_len);
        if self.padding == Side::Pre {
            sequence.resize(fill, self.pad_value);
        }
        sequence.extend(kept.iter().map(|&id| i64::from(id)));
        if self.padding == Side::Post {
            sequence.resize(self.max_len, self.pad_value);
        }
        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_len: usize, padding: Side, truncating: Side) -> SequenceConfig {
        SequenceConfig { max_len, padding, truncating, pad_value: 0 }
    }

    #[test]
    fn test_default_pads_on_the_left() {
        let seq = SequenceConfig::default().with_max_len(5).normalize(&[7, 8]);
        assert_eq!(seq, vec![0, 0, 0, 7, 8]);
    }

    #[test]
    fn test_default_truncates_from_the_start() {
        let seq = SequenceConfig::default().with_max_len(3).normalize(&[1, 2, 3, 4, 5]);
        assert_eq!(seq, vec![3, 4, 5]);
    }

    #[test]
    fn test_post_sides() {
        assert_eq!(config(4, Side::Post, Side::Post).normalize(&[1, 2]), vec![1, 2, 0, 0]);
        assert_eq!(config(2, Side::Post, Side::Post).normalize(&[1, 2, 3]), vec![1, 2]);
    }

    #[test]
    fn test_exact_and_empty_input() {
        let cfg = config(3, Side::Pre, Side::Pre);
        assert_eq!(cfg.normalize(&[4, 5, 6]), vec![4, 5, 6]);
        assert_eq!(cfg.normalize(&[]), vec![0, 0, 0]);
    }

    #[test]
    fn test_custom_pad_value() {
        let cfg = SequenceConfig { pad_value: -1, ..config(3, Side::Pre, Side::Pre) };
        assert_eq!(cfg.normalize(&[9]), vec![-1, -1, 9]);
    }

    #[test]
    fn test_zero_length_is_invalid() {
        assert!(config(0, Side::Pre, Side::Pre).validate().is_err());
        assert!(SequenceConfig::default().validate().is_ok());
    }
}
