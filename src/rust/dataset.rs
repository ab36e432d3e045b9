//! The labelled news corpus behind the dataset-exploration view.
//!
//! Only summary numbers are computed here: how many articles, how many
//! categories, average article length and the per-category distribution.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use log::info;
use serde::Serialize;

pub const DEFAULT_TEXT_COLUMN: &str = "Text";
pub const DEFAULT_LABEL_COLUMN: &str = "Category";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing column '{0}'")]
    MissingColumn(String),
}

/// One labelled article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub text: String,
    pub category: String,
}

impl Article {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Headline numbers for a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_articles: usize,
    pub num_categories: usize,
    pub average_words: usize,
    /// `(category, count)`, largest first
    pub counts: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    articles: Vec<Article>,
}

impl Dataset {
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    /// Loads a CSV with `Text` and `Category` columns.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        Self::from_csv_with_columns(path, DEFAULT_TEXT_COLUMN, DEFAULT_LABEL_COLUMN)
    }

    pub fn from_csv_with_columns(
        path: impl AsRef<Path>,
        text_column: &str,
        label_column: &str,
    ) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)?;
        let dataset = Self::read(&mut reader, text_column, label_column)?;
        info!("Loaded {} articles from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Reads CSV data from any reader, e.g. an in-memory buffer.
    pub fn from_reader<R: io::Read>(rdr: R, text_column: &str, label_column: &str) -> Result<Self, DatasetError> {
        let mut reader = csv::Reader::from_reader(rdr);
        Self::read(&mut reader, text_column, label_column)
    }

    fn read<R: io::Read>(
        reader: &mut csv::Reader<R>,
        text_column: &str,
        label_column: &str,
    ) -> Result<Self, DatasetError> {
        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };
        let text_idx = column(text_column)?;
        let label_idx = column(label_column)?;

        let mut articles = Vec::new();
        for record in reader.records() {
            let record = record?;
            articles.push(Article {
                text: record.get(text_idx).unwrap_or_default().to_string(),
                category: record.get(label_idx).unwrap_or_default().trim().to_string(),
            });
        }
        Ok(Self { articles })
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Distinct categories in the order they first appear.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for article in &self.articles {
            if !seen.contains(&article.category.as_str()) {
                seen.push(article.category.as_str());
            }
        }
        seen
    }

    /// Articles per category, largest first; ties are ordered by name.
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for article in &self.articles {
            *counts.entry(article.category.as_str()).or_default() += 1;
        }
        let mut counts: Vec<(String, usize)> = counts.into_iter().map(|(c, n)| (c.to_string(), n)).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }

    /// Mean words per article, truncated. Zero for an empty dataset.
    pub fn average_word_count(&self) -> usize {
        if self.articles.is_empty() {
            return 0;
        }
        let total: usize = self.articles.iter().map(Article::word_count).sum();
        total / self.articles.len()
    }

    /// Picks one article of `category`; the same seed always gives the same article.
    pub fn sample(&self, category: &str, seed: u64) -> Option<&Article> {
        let matching: Vec<&Article> = self.articles.iter().filter(|a| a.category == category).collect();
        if matching.is_empty() {
            return None;
        }
        let pick = (seed % matching.len() as u64) as usize;
        Some(matching[pick])
    }

    pub fn summary(&self) -> DatasetSummary {
        let counts = self.category_counts();
        DatasetSummary {
            total_articles: self.len(),
            num_categories: counts.len(),
            average_words: self.average_word_count(),
            counts,
        }
    }
}
