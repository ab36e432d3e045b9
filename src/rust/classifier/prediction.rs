use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// How sure the model is, banded from the confidence percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// 50% or below
    Low,
    /// Above 50% and up to 80%
    Medium,
    /// Above 80%
    High,
}

impl ConfidenceLevel {
    pub fn from_percent(percent: f32) -> Self {
        if percent > 80.0 {
            Self::High
        } else if percent > 50.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// The outcome of classifying one text.
///
/// `scores` holds every known label with its probability, in label-set
/// order, so `scores[index]` is always the predicted label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub index: usize,
    /// Probability of `label`, in [0, 1]
    pub confidence: f32,
    pub scores: Vec<(String, f32)>,
}

impl Prediction {
    pub fn confidence_percent(&self) -> f32 {
        self.confidence * 100.0
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_percent(self.confidence_percent())
    }

    /// Probabilities in label-set order.
    pub fn distribution(&self) -> Vec<f32> {
        self.scores.iter().map(|(_, p)| *p).collect()
    }

    pub fn score(&self, label: &str) -> Option<f32> {
        self.scores.iter().find(|(l, _)| l == label).map(|(_, p)| *p)
    }

    /// Labels sorted by descending probability.
    pub fn ranked(&self) -> Vec<(&str, f32)> {
        let mut ranked: Vec<_> = self.scores.iter().map(|(l, p)| (l.as_str(), *p)).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}%)", self.label.to_uppercase(), self.confidence_percent())
    }
}
