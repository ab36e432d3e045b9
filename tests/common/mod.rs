#![allow(dead_code)]

use std::fs;
use std::path::Path;

use newsclass::{Classifier, SequenceModel};

pub const LABELS: [&str; 5] = ["business", "entertainment", "politics", "sport", "tech"];

/// `(word, label index)`; word indices are assigned in this order starting at 1.
pub const VOCABULARY: [(&str, usize); 20] = [
    ("market", 0),
    ("shares", 0),
    ("profit", 0),
    ("company", 0),
    ("film", 1),
    ("music", 1),
    ("award", 1),
    ("actor", 1),
    ("election", 2),
    ("minister", 2),
    ("vote", 2),
    ("party", 2),
    ("football", 3),
    ("match", 3),
    ("goal", 3),
    ("players", 3),
    ("software", 4),
    ("computer", 4),
    ("internet", 4),
    ("phone", 4),
];

pub const MAX_LEN: usize = 300;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Scores each category by how many of its keywords appear, then softmaxes.
#[derive(Debug)]
pub struct KeywordModel;

impl SequenceModel for KeywordModel {
    fn predict(&self, sequence: &[i64]) -> anyhow::Result<Vec<f32>> {
        anyhow::ensure!(sequence.len() == MAX_LEN, "expected {} items, got {}", MAX_LEN, sequence.len());

        let mut counts = [0f32; LABELS.len()];
        for &id in sequence.iter().filter(|&&id| id > 0) {
            let (_, label) = VOCABULARY
                .get(id as usize - 1)
                .ok_or_else(|| anyhow::anyhow!("index {} outside the vocabulary", id))?;
            counts[*label] += 1.0;
        }

        let max = counts.iter().copied().fold(0.0, f32::max);
        let exp: Vec<f32> = counts.iter().map(|c| ((c - max) * 3.0).exp()).collect();
        let sum: f32 = exp.iter().sum();
        Ok(exp.iter().map(|e| e / sum).collect())
    }

    fn input_len(&self) -> Option<usize> {
        Some(MAX_LEN)
    }

    fn output_size(&self) -> Option<usize> {
        Some(LABELS.len())
    }
}

/// Writes a word-index tokenizer export and a label file into `dir`.
pub fn write_artifacts(dir: &Path) {
    let word_index: serde_json::Map<String, serde_json::Value> = VOCABULARY
        .iter()
        .enumerate()
        .map(|(i, (word, _))| (word.to_string(), serde_json::Value::from(i + 1)))
        .collect();
    let export = serde_json::json!({
        "class_name": "Tokenizer",
        "config": {
            "num_words": null,
            "lower": true,
            "split": " ",
            "char_level": false,
            "oov_token": null,
            "word_index": serde_json::Value::Object(word_index).to_string(),
        }
    });
    fs::write(dir.join("tokenizer.json"), export.to_string()).unwrap();
    fs::write(dir.join("labels.json"), serde_json::to_string(&LABELS).unwrap()).unwrap();
}

pub fn classifier() -> Classifier {
    init();
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());

    Classifier::builder()
        .with_tokenizer_file(dir.path().join("tokenizer.json"))
        .unwrap()
        .with_labels_file(dir.path().join("labels.json"))
        .unwrap()
        .with_model(KeywordModel)
        .unwrap()
        .build()
        .expect("Failed to create classifier")
}
