//! Line-to-summary similarity
//!
//! Three signals are fused into one score in [0, 1]:
//!
//! | Signal   | Weight | Source                                          |
//! |----------|--------|-------------------------------------------------|
//! | semantic | 0.5    | max cosine between line and summary embeddings  |
//! | lexical  | 0.3    | max TF-IDF cosine between line and summary      |
//! | overlap  | 0.2    | Jaccard of stopword-filtered token sets         |
//!
//! Without embeddings the lexical and overlap weights are renormalized.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::text::{word_tokens, StopwordFilter, TfidfConfig, TfidfVectorizer};

/// What to do when sentence embeddings cannot be produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingFailurePolicy {
    /// Abort scoring of the page
    #[default]
    Fail,
    /// Score with lexical and overlap signals only
    Degrade,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub semantic_weight: f64,
    pub lexical_weight: f64,
    pub overlap_weight: f64,
    /// Vocabulary cap of the per-line TF-IDF fit
    pub lexical_max_features: usize,
    pub on_embedding_failure: EmbeddingFailurePolicy,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.5,
            lexical_weight: 0.3,
            overlap_weight: 0.2,
            lexical_max_features: 1000,
            on_embedding_failure: EmbeddingFailurePolicy::Fail,
        }
    }
}

/// The individual signals behind a fused score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityBreakdown {
    /// `None` when embeddings were unavailable
    pub semantic: Option<f64>,
    pub lexical: f64,
    pub overlap: f64,
}

/// Weighted fusion of the three signals, clamped to [0, 1].
pub fn fuse_similarity(parts: &SimilarityBreakdown, config: &SimilarityConfig) -> f64 {
    let fused = if let Some(semantic) = parts.semantic {
        config.semantic_weight * semantic
            + config.lexical_weight * parts.lexical
            + config.overlap_weight * parts.overlap
    } else {
        let total = config.lexical_weight + config.overlap_weight;
        if total <= 0.0 {
            0.0
        } else {
            (config.lexical_weight * parts.lexical + config.overlap_weight * parts.overlap) / total
        }
    };
    fused.clamp(0.0, 1.0)
}

/// Maximum cosine similarity over all pairs of `a` and `b`.
///
/// Zero when either side is empty or every pair involves a zero vector.
pub fn max_cosine(a: &[Vec<f32>], b: &[Vec<f32>]) -> f64 {
    let mut best: Option<f64> = None;
    for x in a {
        for y in b {
            if let Some(c) = cosine(x, y) {
                best = Some(best.map_or(c, |b: f64| b.max(c)));
            }
        }
    }
    best.unwrap_or(0.0)
}

fn cosine(x: &[f32], y: &[f32]) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }
    let (mut dot, mut nx, mut ny) = (0.0f64, 0.0f64, 0.0f64);
    for (a, b) in x.iter().zip(y) {
        let (a, b) = (f64::from(*a), f64::from(*b));
        dot += a * b;
        nx += a * a;
        ny += b * b;
    }
    if nx == 0.0 || ny == 0.0 {
        return None;
    }
    Some(dot / (nx.sqrt() * ny.sqrt()))
}

/// Maximum TF-IDF cosine between `line` and any summary sentence.
///
/// The vectorizer is fitted on the line plus the summary sentences. Any
/// fitting failure (e.g. only stopwords) yields 0.
pub fn lexical_similarity(line: &str, summary_sentences: &[String], max_features: usize) -> f64 {
    if summary_sentences.is_empty() {
        return 0.0;
    }
    let mut docs: Vec<&str> = Vec::with_capacity(summary_sentences.len() + 1);
    docs.push(line);
    docs.extend(summary_sentences.iter().map(String::as_str));

    let vectorizer = TfidfVectorizer::new(TfidfConfig {
        max_features: Some(max_features),
        ..TfidfConfig::default()
    });
    match vectorizer.fit_transform(&docs) {
        Ok(matrix) => (1..docs.len())
            .map(|i| matrix.cosine(0, i))
            .fold(0.0, f64::max),
        Err(_) => 0.0,
    }
}

/// Jaccard similarity between the line's and the summary's token sets.
///
/// Tokens are lowercased and NLTK stopwords are removed.
pub fn token_overlap(line: &str, summary_sentences: &[String], stopwords: &StopwordFilter) -> f64 {
    let token_set = |text: &str| -> FxHashSet<String> {
        word_tokens(&text.to_lowercase())
            .into_iter()
            .filter(|t| !stopwords.is_stopword(t))
            .collect()
    };

    let line_tokens = token_set(line);
    let summary_tokens = token_set(&summary_sentences.join(" "));
    if line_tokens.is_empty() || summary_tokens.is_empty() {
        return 0.0;
    }

    let intersection = line_tokens.intersection(&summary_tokens).count();
    let union = line_tokens.union(&summary_tokens).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn fusion_weights() {
        let parts = SimilarityBreakdown {
            semantic: Some(0.8),
            lexical: 0.5,
            overlap: 0.25,
        };
        let expected = 0.5 * 0.8 + 0.3 * 0.5 + 0.2 * 0.25;
        assert!((fuse_similarity(&parts, &SimilarityConfig::default()) - expected).abs() < 1e-12);
    }

    #[test]
    fn fusion_without_semantic_renormalizes() {
        let parts = SimilarityBreakdown {
            semantic: None,
            lexical: 1.0,
            overlap: 0.0,
        };
        assert!((fuse_similarity(&parts, &SimilarityConfig::default()) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn fusion_is_clamped() {
        let parts = SimilarityBreakdown {
            semantic: Some(-1.0),
            lexical: 0.0,
            overlap: 0.0,
        };
        assert!(fuse_similarity(&parts, &SimilarityConfig::default()).abs() < f64::EPSILON);
    }

    #[test]
    fn max_cosine_picks_best_pair() {
        let a = vec![vec![1.0, 0.0]];
        let b = vec![vec![0.0, 1.0], vec![1.0, 1.0]];
        let c = max_cosine(&a, &b);
        assert!((c - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!(max_cosine(&a, &[]).abs() < f64::EPSILON);
        assert!(max_cosine(&[vec![0.0, 0.0]], &b).abs() < f64::EPSILON);
    }

    #[test]
    fn lexical_similarity_of_identical_text_is_one() {
        let s = summary(&["The revolution toppled the monarchy."]);
        let sim = lexical_similarity("The revolution toppled the monarchy.", &s, 1000);
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn lexical_similarity_failure_is_zero() {
        let s = summary(&["and the of"]);
        assert!(lexical_similarity("it is", &s, 1000).abs() < f64::EPSILON);
        assert!(lexical_similarity("revolution", &[], 1000).abs() < f64::EPSILON);
    }

    #[test]
    fn token_overlap_is_jaccard() {
        let stop = StopwordFilter::nltk();
        // {king, fled} vs {king, returned}
        let s = summary(&["The king returned"]);
        let o = token_overlap("The king fled", &s, &stop);
        assert!((o - 1.0 / 3.0).abs() < 1e-12);
        assert!(token_overlap("the and", &s, &stop).abs() < f64::EPSILON);
    }
}
