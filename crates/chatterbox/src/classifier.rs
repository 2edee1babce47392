//! Intent classifier collaborator.
//!
//! The bot only needs `classify(text) -> label`. Real deployments plug in a
//! trained model; this module ships a fixed-label classifier and a small
//! lexicon classifier built from labeled example phrases.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use chat_tokenizer::normalize;
use token_core::Token;

use crate::error::ClassifyError;

/// Maps free text to an intent label.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<String, ClassifyError>;
}

/// Labels every text with the same label.
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    label: String,
}

impl FixedClassifier {
    pub fn new(label: impl Into<String>) -> Self {
        FixedClassifier { label: label.into() }
    }
}

#[async_trait]
impl IntentClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Result<String, ClassifyError> {
        Ok(self.label.clone())
    }
}

/// Bag-of-words classifier over labeled example phrases.
///
/// Each label's vocabulary is the set of tokens of its examples, weighted by
/// how many examples used them. A text scores, per label, the summed weight
/// of its tokens; the best label wins, ties go to the label seen first, and a
/// text sharing no token with any label gets the fallback label.
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    /// Labels in first-seen order.
    labels: Vec<String>,
    /// Token → per-label weight, indexed like `labels`.
    weights: HashMap<Token, Vec<u32>>,
    fallback: String,
}

impl LexiconClassifier {
    /// Build from `(label, phrase)` examples.
    pub fn from_examples<I, L, P>(examples: I, fallback: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (L, P)>,
        L: AsRef<str>,
        P: AsRef<str>,
    {
        let mut labels: Vec<String> = Vec::new();
        let mut weights: HashMap<Token, Vec<u32>> = HashMap::new();

        for (label, phrase) in examples {
            let label = label.as_ref().trim();
            let index = match labels.iter().position(|l| l == label) {
                Some(index) => index,
                None => {
                    labels.push(label.to_string());
                    labels.len() - 1
                }
            };

            let mut tokens = normalize(phrase.as_ref());
            tokens.sort_unstable();
            tokens.dedup();
            for token in tokens {
                let row = weights.entry(token).or_default();
                if row.len() <= index {
                    row.resize(index + 1, 0);
                }
                row[index] += 1;
            }
        }

        log::info!(
            "intent lexicon built with {} labels and {} words",
            labels.len(),
            weights.len()
        );

        LexiconClassifier {
            labels,
            weights,
            fallback: fallback.into(),
        }
    }

    /// Parse tab-separated `label<TAB>phrase` rows. The first row is a header
    /// and is skipped, as are blank lines and `#` comments.
    pub fn from_tsv(content: &str, fallback: impl Into<String>) -> Result<Self, ClassifyError> {
        let mut examples = Vec::new();
        for (index, line) in content.lines().enumerate().skip(1) {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let (label, phrase) = line
                .split_once('\t')
                .filter(|(label, _)| !label.trim().is_empty())
                .ok_or(ClassifyError::Malformed { line: index + 1 })?;
            examples.push((label.to_string(), phrase.to_string()));
        }
        Ok(Self::from_examples(examples, fallback))
    }

    /// Read a TSV file, see [`from_tsv`](Self::from_tsv).
    pub fn load(path: &Path, fallback: impl Into<String>) -> Result<Self, ClassifyError> {
        let content = fs::read_to_string(path).map_err(|source| ClassifyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_tsv(&content, fallback)
    }

    /// Labels in first-seen order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn best_label(&self, text: &str) -> &str {
        let mut scores = vec![0u32; self.labels.len()];
        for token in normalize(text) {
            if let Some(row) = self.weights.get(&token) {
                for (score, weight) in scores.iter_mut().zip(row) {
                    *score += weight;
                }
            }
        }

        let mut best: Option<(usize, u32)> = None;
        for (index, &score) in scores.iter().enumerate() {
            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((index, score));
            }
        }

        match best {
            Some((index, _)) => &self.labels[index],
            None => &self.fallback,
        }
    }
}

#[async_trait]
impl IntentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<String, ClassifyError> {
        Ok(self.best_label(text).to_string())
    }
}
