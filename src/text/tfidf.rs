//! TF-IDF vectorization
//!
//! Word n-gram TF-IDF with document-frequency pruning and a vocabulary cap.
//! Weighting follows the common smoothed formulation:
//!
//! ```text
//! idf(t)   = ln((1 + n) / (1 + df(t))) + 1
//! w(d, t)  = count(d, t) * idf(t), rows L2-normalized
//! ```
//!
//! Tokens are lowercased runs of two or more word characters. Stopwords are
//! removed before n-grams are formed.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;

use super::stopwords::StopwordFilter;
use super::{Result, TextError};

static TERM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

/// Vectorizer settings.
#[derive(Debug, Clone)]
pub struct TfidfConfig {
    /// Inclusive n-gram range
    pub ngram_range: (usize, usize),
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in
    pub max_df: f64,
    /// Keep only the most frequent terms across the corpus
    pub max_features: Option<usize>,
    pub stopwords: StopwordFilter,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            ngram_range: (1, 1),
            min_df: 1,
            max_df: 1.0,
            max_features: None,
            stopwords: StopwordFilter::sklearn(),
        }
    }
}

/// Sparse, row-normalized TF-IDF weights.
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    /// Terms in sorted order; column index = position
    pub vocabulary: Vec<String>,
    /// One sparse row per document: column -> weight
    pub rows: Vec<FxHashMap<usize, f64>>,
}

impl TfidfMatrix {
    /// Mean weight of every column across all rows.
    #[must_use]
    pub fn mean_weights(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.vocabulary.len()];
        for row in &self.rows {
            for (&col, &w) in row {
                sums[col] += w;
            }
        }
        let n = self.rows.len().max(1) as f64;
        sums.into_iter().map(|s| s / n).collect()
    }

    /// Cosine similarity of two rows (rows are unit length, so a dot product).
    #[must_use]
    pub fn cosine(&self, a: usize, b: usize) -> f64 {
        let (Some(ra), Some(rb)) = (self.rows.get(a), self.rows.get(b)) else {
            return 0.0;
        };
        let (small, large) = if ra.len() <= rb.len() { (ra, rb) } else { (rb, ra) };
        small
            .iter()
            .filter_map(|(col, w)| large.get(col).map(|v| w * v))
            .sum()
    }
}

/// Fits TF-IDF weights over a small corpus.
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
}

impl TfidfVectorizer {
    #[must_use]
    pub fn new(config: TfidfConfig) -> Self {
        Self { config }
    }

    /// Analyze one document into its n-gram terms.
    #[must_use]
    pub fn analyze(&self, doc: &str) -> Vec<String> {
        let lower = doc.to_lowercase();
        let words: Vec<&str> = TERM
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|w| !self.config.stopwords.is_stopword(w))
            .collect();

        let (min_n, max_n) = self.config.ngram_range;
        let mut terms = Vec::new();
        for n in min_n.max(1)..=max_n {
            if words.len() < n {
                break;
            }
            for window in words.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Fit the vocabulary and return the weight matrix.
    pub fn fit_transform(&self, docs: &[&str]) -> Result<TfidfMatrix> {
        let n_docs = docs.len();
        let counts: Vec<FxHashMap<String, usize>> = docs
            .iter()
            .map(|doc| {
                let mut m = FxHashMap::default();
                for term in self.analyze(doc) {
                    *m.entry(term).or_insert(0) += 1;
                }
                m
            })
            .collect();

        let mut df: FxHashMap<&str, usize> = FxHashMap::default();
        let mut total: FxHashMap<&str, usize> = FxHashMap::default();
        for doc in &counts {
            for (term, &c) in doc {
                *df.entry(term.as_str()).or_insert(0) += 1;
                *total.entry(term.as_str()).or_insert(0) += c;
            }
        }
        if df.is_empty() {
            return Err(TextError::EmptyVocabulary);
        }

        let max_docs = self.config.max_df * n_docs as f64;
        if max_docs < self.config.min_df as f64 {
            return Err(TextError::InvalidDocumentFrequency {
                max_docs,
                min_docs: self.config.min_df,
            });
        }

        let mut kept: Vec<&str> = df
            .iter()
            .filter(|(_, &d)| d >= self.config.min_df && d as f64 <= max_docs)
            .map(|(t, _)| *t)
            .collect();
        if kept.is_empty() {
            return Err(TextError::EmptyVocabulary);
        }

        if let Some(limit) = self.config.max_features {
            if kept.len() > limit {
                kept.sort_by(|a, b| total[b].cmp(&total[a]).then_with(|| a.cmp(b)));
                kept.truncate(limit);
            }
        }
        kept.sort_unstable();

        let index: FxHashMap<&str, usize> =
            kept.iter().enumerate().map(|(i, t)| (*t, i)).collect();
        let idf: Vec<f64> = kept
            .iter()
            .map(|t| ((1.0 + n_docs as f64) / (1.0 + df[t] as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .iter()
            .map(|doc| {
                let mut row: FxHashMap<usize, f64> = doc
                    .iter()
                    .filter_map(|(term, &c)| {
                        index.get(term.as_str()).map(|&col| (col, c as f64 * idf[col]))
                    })
                    .collect();
                let norm = row.values().map(|w| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for w in row.values_mut() {
                        *w /= norm;
                    }
                }
                row
            })
            .collect();

        Ok(TfidfMatrix {
            vocabulary: kept.into_iter().map(str::to_string).collect(),
            rows,
        })
    }
}

/// Sort `(term, weight)` pairs by descending weight, ties by term.
pub(crate) fn rank_desc(pairs: &mut [(String, f64)]) {
    pairs.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bigram_config() -> TfidfConfig {
        TfidfConfig {
            ngram_range: (1, 2),
            min_df: 2,
            max_df: 0.8,
            max_features: Some(100),
            stopwords: StopwordFilter::sklearn(),
        }
    }

    #[test]
    fn analyze_removes_stopwords_before_ngrams() {
        let v = TfidfVectorizer::new(bigram_config());
        let terms = v.analyze("The French Revolution of 1789");
        assert_eq!(
            terms,
            vec!["french", "revolution", "1789", "french revolution", "revolution 1789"]
        );
    }

    #[test]
    fn single_char_tokens_are_ignored() {
        let v = TfidfVectorizer::default();
        assert_eq!(v.analyze("a b cd"), vec!["cd"]);
    }

    #[test]
    fn rows_are_unit_length() {
        let v = TfidfVectorizer::default();
        let m = v.fit_transform(&["king queen", "king castle", "queen castle moat"]).unwrap();
        for row in &m.rows {
            let norm: f64 = row.values().map(|w| w * w).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
        assert!((m.cosine(0, 0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn document_frequency_bounds_prune_terms() {
        let v = TfidfVectorizer::new(bigram_config());
        let docs = [
            "revolution in france",
            "revolution and the monarchy",
            "monarchy collapsed quickly",
            "the assembly met",
            "revolution spread",
        ];
        let m = v.fit_transform(&docs).unwrap();
        // "revolution": 3 of 5 docs (<= 4), "monarchy": 2 docs; singletons pruned
        assert_eq!(m.vocabulary, vec!["monarchy", "revolution"]);
    }

    #[test]
    fn too_few_documents_for_bounds_is_an_error() {
        let v = TfidfVectorizer::new(bigram_config());
        let err = v.fit_transform(&["revolution", "revolution"]).unwrap_err();
        assert!(matches!(err, TextError::InvalidDocumentFrequency { .. }));
    }

    #[test]
    fn stopword_only_corpus_is_empty_vocabulary() {
        let v = TfidfVectorizer::default();
        let err = v.fit_transform(&["the and of", "it is"]).unwrap_err();
        assert_eq!(err, TextError::EmptyVocabulary);
    }

    #[test]
    fn max_features_keeps_most_frequent() {
        let v = TfidfVectorizer::new(TfidfConfig {
            max_features: Some(1),
            ..TfidfConfig::default()
        });
        let m = v.fit_transform(&["king king queen", "king castle"]).unwrap();
        assert_eq!(m.vocabulary, vec!["king"]);
    }

    #[test]
    fn mean_weights_average_over_rows() {
        let v = TfidfVectorizer::default();
        let m = v.fit_transform(&["king", "queen"]).unwrap();
        let means = m.mean_weights();
        assert_eq!(means.len(), 2);
        assert!(means.iter().all(|w| (w - 0.5).abs() < 1e-9));
    }
}
