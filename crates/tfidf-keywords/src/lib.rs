//! TF-IDF keyword extraction against a static corpus snapshot.
//!
//! [`TfIdfModel::build`] counts, for every token, how many messages of the
//! corpus contain it, and turns that into an inverse document frequency:
//!
//! ```text
//! idf(t) = ln(total_documents / (1 + document_frequency(t)))
//! ```
//!
//! [`TfIdfModel::extract_keywords`] scores each distinct token of a text by
//! `tf × idf` and returns the best ones. Tokens the corpus never contained
//! have no IDF and are skipped rather than scored as zero.
//!
//! The table is built once and never updated. Callers that keep learning from
//! new messages should expect keyword quality to lag behind their models.

use std::collections::{HashMap, HashSet};

use chat_tokenizer::normalize;
use token_core::Token;

/// Default number of keywords returned by [`TfIdfModel::extract_keywords`] callers.
pub const DEFAULT_TOP_N: usize = 3;

/// Inverse document frequency table built from a corpus of messages.
#[derive(Debug, Clone, Default)]
pub struct TfIdfModel {
    /// Token → number of corpus messages containing it at least once.
    document_frequency: HashMap<Token, usize>,
    /// Token → `ln(total / (1 + df))`.
    idf: HashMap<Token, f64>,
    /// Number of messages in the corpus, blank ones included.
    total_documents: usize,
}

impl TfIdfModel {
    /// Build the IDF table from a corpus of raw message texts.
    ///
    /// Each message counts once per distinct token, however often the token
    /// repeats inside it. An empty corpus yields an empty table, and such a
    /// model never produces keywords.
    pub fn build<I>(corpus: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut document_frequency: HashMap<Token, usize> = HashMap::new();
        let mut total_documents = 0;

        for message in corpus {
            total_documents += 1;
            let distinct: HashSet<Token> = normalize(message.as_ref()).into_iter().collect();
            for token in distinct {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        let total = total_documents as f64;
        let idf = document_frequency
            .iter()
            .map(|(token, &df)| (token.clone(), (total / (1.0 + df as f64)).ln()))
            .collect::<HashMap<_, _>>();

        log::info!(
            "keyword extractor built from {total_documents} messages with {} unique words",
            idf.len()
        );

        TfIdfModel {
            document_frequency,
            idf,
            total_documents,
        }
    }

    /// Rank the tokens of `text` by TF-IDF and return at most `top_n` of them,
    /// highest score first.
    ///
    /// Ties keep the order in which the tokens first appear in `text`.
    pub fn extract_keywords(&self, text: &str, top_n: usize) -> Vec<Token> {
        let tokens = normalize(text);
        if tokens.is_empty() || top_n == 0 {
            return Vec::new();
        }

        // Distinct tokens in first-appearance order, with their counts.
        let mut order: Vec<&Token> = Vec::new();
        let mut counts: HashMap<&Token, usize> = HashMap::new();
        for token in &tokens {
            let count = counts.entry(token).or_insert(0);
            if *count == 0 {
                order.push(token);
            }
            *count += 1;
        }

        let total = tokens.len() as f64;
        let mut scored: Vec<(&Token, f64)> = order
            .into_iter()
            .filter_map(|token| {
                let idf = self.idf.get(token)?;
                let tf = counts[token] as f64 / total;
                Some((token, tf * idf))
            })
            .collect();

        // `sort_by` is stable, so equal scores stay in appearance order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored
            .into_iter()
            .take(top_n)
            .map(|(token, _)| token.clone())
            .collect()
    }

    /// IDF score of a token, or `None` if the corpus never contained it.
    pub fn idf(&self, token: &str) -> Option<f64> {
        self.idf.get(token).copied()
    }

    /// Number of corpus messages containing the token.
    pub fn document_frequency(&self, token: &str) -> usize {
        self.document_frequency.get(token).copied().unwrap_or(0)
    }

    /// Number of messages the table was built from.
    pub fn total_documents(&self) -> usize {
        self.total_documents
    }

    /// Number of distinct tokens with an IDF score.
    pub fn len(&self) -> usize {
        self.idf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }
}
