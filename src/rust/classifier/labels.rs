use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;

use super::error::{ArtifactKind, ClassifierError};

/// Ordered category names; position `i` names output `i` of the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelFile {
    List(Vec<String>),
    Encoder { classes: Vec<String> },
}

impl LabelEncoder {
    /// Creates an encoder, rejecting an empty set, empty labels and duplicates.
    pub fn new(classes: Vec<impl Into<String>>) -> Result<Self, ClassifierError> {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();

        if classes.is_empty() {
            return Err(ClassifierError::Validation("Label set cannot be empty".into()));
        }
        if let Some(pos) = classes.iter().position(|c| c.trim().is_empty()) {
            return Err(ClassifierError::Validation(format!("Label {} cannot be empty", pos + 1)));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = classes.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(ClassifierError::Validation(format!("Duplicate label '{}'", dup)));
        }

        let index = classes.iter().enumerate().map(|(i, c)| (c.clone(), i)).collect();
        Ok(Self { classes, index })
    }

    /// Parses a JSON label list (`[...]` or `{"classes": [...]}`), falling back
    /// to one label per non-blank line.
    pub fn parse(contents: &str) -> Result<Self, ClassifierError> {
        let trimmed = contents.trim_start();
        let classes = if trimmed.starts_with('[') || trimmed.starts_with('{') {
            match serde_json::from_str::<LabelFile>(contents)
                .map_err(|e| ClassifierError::artifact(ArtifactKind::Labels, format!("invalid JSON: {}", e)))?
            {
                LabelFile::List(classes) | LabelFile::Encoder { classes } => classes,
            }
        } else {
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        };
        Self::new(classes).map_err(|e| match e {
            ClassifierError::Validation(reason) => ClassifierError::artifact(ArtifactKind::Labels, reason),
            other => other,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::artifact(
                ArtifactKind::Labels,
                format!("file not found: {}", path.display()),
            ));
        }
        let contents = fs::read_to_string(path).map_err(|e| ClassifierError::artifact(ArtifactKind::Labels, e))?;
        let encoder = Self::parse(&contents)?;
        info!("Loaded {} labels from {}", encoder.len(), path.display());
        Ok(encoder)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Label for a model output index.
    pub fn inverse_transform(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// Model output index for a label.
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }
}
