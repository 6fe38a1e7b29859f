//! Topic keyword extraction
//!
//! Treats each sentence of the document as a TF-IDF document over word
//! unigrams and bigrams, averages each term's weight across sentences and
//! keeps the strongest terms.

use serde::{Deserialize, Serialize};

use crate::text::tfidf::rank_desc;
use crate::text::{self, sentences, StopwordFilter, TextError, TfidfConfig, TfidfVectorizer};

/// Keyword extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Number of keywords kept at most
    pub top_n: usize,
    /// Minimum mean weight for a term to count as a keyword
    pub min_weight: f64,
    pub min_df: usize,
    pub max_df: f64,
    pub max_features: usize,
    pub max_ngram: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            top_n: 20,
            min_weight: 0.1,
            min_df: 2,
            max_df: 0.8,
            max_features: 100,
            max_ngram: 2,
        }
    }
}

impl KeywordConfig {
    fn vectorizer(&self) -> TfidfVectorizer {
        TfidfVectorizer::new(TfidfConfig {
            ngram_range: (1, self.max_ngram.max(1)),
            min_df: self.min_df,
            max_df: self.max_df,
            max_features: Some(self.max_features),
            stopwords: StopwordFilter::sklearn(),
        })
    }
}

/// Extract topic keywords from a document, strongest first.
///
/// Documents with fewer than two sentences have no keywords. Vocabulary
/// failures (everything pruned, too few sentences for the document
/// frequency bounds) are returned as errors so callers can log them.
pub fn extract_topic_keywords(text: &str, config: &KeywordConfig) -> text::Result<Vec<String>> {
    let sents = sentences(text);
    if sents.len() < 2 {
        return Ok(Vec::new());
    }

    let docs: Vec<&str> = sents.iter().map(String::as_str).collect();
    let matrix = config.vectorizer().fit_transform(&docs)?;
    if matrix.vocabulary.is_empty() {
        return Err(TextError::EmptyVocabulary);
    }

    let mut ranked: Vec<(String, f64)> = matrix
        .vocabulary
        .iter()
        .cloned()
        .zip(matrix.mean_weights())
        .filter(|(_, w)| *w > config.min_weight)
        .collect();
    rank_desc(&mut ranked);
    ranked.truncate(config.top_n);

    Ok(ranked.into_iter().map(|(term, _)| term).collect())
}
