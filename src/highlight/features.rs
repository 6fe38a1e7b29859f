//! Per-line features
//!
//! Computes the [`FeatureSet`] for a line: surface statistics, proper-noun
//! and topic-keyword matches against the document vocabulary, the
//! irrelevance flag and the topic relevance score.

use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::entities::EntityExtractor;
use super::{HighlightError, Result};
use crate::text::{is_alpha, sentences, word_tokens, StopwordFilter, Tagger};

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+\b").expect("valid regex"));
static ALL_CAPS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}\b").expect("valid regex"));
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{4}\b|\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").expect("valid regex")
});

/// Default personal / anecdotal patterns, matched against lowercased text.
pub const DEFAULT_IRRELEVANCE_PATTERNS: &[&str] = &[
    r"\bi (like|love|hate|enjoy|prefer|think|believe|feel)\b",
    r"\bmy (favourite|favorite|phone|battery)\b",
    r"\bi went to\b",
    r"\bi really\b",
    r"\bit was fun\b",
    r"\bon fridays?\b",
    r"\blike to stare at\b",
    r"\bimagine shapes\b",
    r"\bright now\b",
    r"\bsquirrels?\b.*\bnuts?\b",
    r"\bpizza\b",
    r"\bcolour.*green.*spring leaf\b",
    r"\bphone battery.*%\b",
    r"\bstuff\b",
    r"\bthings?\b.*\bcool\b",
    r"\byou know\b",
    r"\bguess what\b",
];

/// Substrings that mark casual register.
pub const DEFAULT_CASUAL_INDICATORS: &[&str] = &[
    "i ", "my ", "really", "like", "enjoy", "fun", "favourite", "favorite",
];

/// Vocabulary of academic discourse used by the relevance score.
pub const DEFAULT_ACADEMIC_TERMS: &[&str] = &[
    "period", "history", "political", "social", "economic", "revolution", "government", "society",
    "culture", "movement", "event", "century", "era", "regime", "system", "war", "conflict",
    "treaty", "document", "declaration", "constitution", "law", "reform", "change", "influence",
];

/// Irrelevance and topic-relevance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceConfig {
    pub irrelevance_patterns: Vec<String>,
    pub casual_indicators: Vec<String>,
    /// Casual indicators needed to flag a line without topic keywords
    pub casual_min: usize,
    pub academic_terms: Vec<String>,
    /// Added to the relevance score when any topic keyword occurs
    pub topic_bonus: f64,
    /// Added to the relevance score when any proper noun occurs
    pub proper_noun_bonus: f64,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            irrelevance_patterns: to_strings(DEFAULT_IRRELEVANCE_PATTERNS),
            casual_indicators: to_strings(DEFAULT_CASUAL_INDICATORS),
            casual_min: 2,
            academic_terms: to_strings(DEFAULT_ACADEMIC_TERMS),
            topic_bonus: 0.1,
            proper_noun_bonus: 0.05,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Per-line feature vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_word_length: f64,
    /// Fraction of tokens that are alphabetic non-stopwords
    pub content_ratio: f64,
    /// Distinct part-of-speech tags per token
    pub pos_diversity: f64,
    pub has_numbers: bool,
    pub has_caps: bool,
    pub has_dates: bool,
    pub proper_noun_matches: usize,
    pub topic_keyword_matches: usize,
    pub proper_noun_density: f64,
    pub topic_keyword_density: f64,
    pub has_proper_nouns: bool,
    pub has_topic_keywords: bool,
    pub is_irrelevant: bool,
    pub topic_relevance_score: f64,
}

/// Compiled irrelevance rules.
#[derive(Debug, Clone)]
pub struct IrrelevanceDetector {
    patterns: Vec<Regex>,
    casual_indicators: Vec<String>,
    casual_min: usize,
}

impl Default for IrrelevanceDetector {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_IRRELEVANCE_PATTERNS
                .iter()
                .map(|p| Regex::new(p).expect("valid regex"))
                .collect(),
            casual_indicators: to_strings(DEFAULT_CASUAL_INDICATORS),
            casual_min: 2,
        }
    }
}

impl IrrelevanceDetector {
    /// Compile the configured patterns.
    ///
    /// # Errors
    ///
    /// Returns [`HighlightError::Config`] if a pattern is not a valid regex.
    pub fn new(config: &RelevanceConfig) -> Result<Self> {
        let patterns = config
            .irrelevance_patterns
            .iter()
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| HighlightError::Config(format!("invalid irrelevance pattern '{p}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            casual_indicators: config.casual_indicators.iter().map(|s| s.to_lowercase()).collect(),
            casual_min: config.casual_min,
        })
    }

    /// True when the line is personal or anecdotal.
    ///
    /// A line is irrelevant if any pattern matches, or if it contains no
    /// topic keyword and at least `casual_min` casual indicators.
    pub fn is_irrelevant(&self, text: &str, topic_keywords: &[String]) -> bool {
        let lower = text.to_lowercase();

        if self.patterns.iter().any(|re| re.is_match(&lower)) {
            return true;
        }

        let has_topic = topic_keywords.iter().any(|kw| lower.contains(&kw.to_lowercase()));
        if has_topic {
            return false;
        }

        let casual = self
            .casual_indicators
            .iter()
            .filter(|ind| lower.contains(ind.as_str()))
            .count();
        casual >= self.casual_min
    }
}

/// Detect an irrelevant line with the default rules.
pub fn detect_irrelevant(text: &str, topic_keywords: &[String]) -> bool {
    static DEFAULT: LazyLock<IrrelevanceDetector> = LazyLock::new(IrrelevanceDetector::default);
    DEFAULT.is_irrelevant(text, topic_keywords)
}

/// Topic relevance of a line, in [0, 1].
///
/// Counts topic keywords, document proper nouns and academic terms that
/// occur in the line (case-insensitive substring), divides by the token
/// count and adds fixed bonuses for keyword and proper-noun presence.
pub fn topic_relevance_score(
    text: &str,
    topic_keywords: &[String],
    proper_nouns: &BTreeSet<String>,
    config: &RelevanceConfig,
) -> f64 {
    let lower = text.to_lowercase();
    let tokens = word_tokens(&lower);
    if tokens.is_empty() {
        return 0.0;
    }

    let topic_matches = topic_keywords
        .iter()
        .filter(|kw| lower.contains(&kw.to_lowercase()))
        .count();
    let noun_matches = proper_nouns
        .iter()
        .filter(|pn| lower.contains(&pn.to_lowercase()))
        .count();
    let academic_matches = config
        .academic_terms
        .iter()
        .filter(|term| lower.contains(&term.to_lowercase()))
        .count();

    let mut score = (topic_matches + noun_matches + academic_matches) as f64 / tokens.len() as f64;
    if topic_matches > 0 {
        score += config.topic_bonus;
    }
    if noun_matches > 0 {
        score += config.proper_noun_bonus;
    }

    score.min(1.0)
}

/// Computes [`FeatureSet`]s against a fixed document vocabulary.
#[derive(Clone)]
pub struct FeatureCalculator {
    entities: EntityExtractor,
    stopwords: StopwordFilter,
    detector: IrrelevanceDetector,
    relevance: RelevanceConfig,
}

impl Default for FeatureCalculator {
    fn default() -> Self {
        Self {
            entities: EntityExtractor::default(),
            stopwords: StopwordFilter::nltk(),
            detector: IrrelevanceDetector::default(),
            relevance: RelevanceConfig::default(),
        }
    }
}

/// Compute line features with the default tagger and rules.
pub fn compute_features(
    text: &str,
    topic_keywords: &[String],
    proper_nouns: &BTreeSet<String>,
) -> FeatureSet {
    static DEFAULT: LazyLock<FeatureCalculator> = LazyLock::new(FeatureCalculator::default);
    DEFAULT.compute(text, topic_keywords, proper_nouns)
}

impl FeatureCalculator {
    /// # Errors
    ///
    /// Returns [`HighlightError::Config`] if an irrelevance pattern is invalid.
    pub fn new(entities: EntityExtractor, relevance: RelevanceConfig) -> Result<Self> {
        Ok(Self {
            entities,
            stopwords: StopwordFilter::nltk(),
            detector: IrrelevanceDetector::new(&relevance)?,
            relevance,
        })
    }

    fn tagger(&self) -> &Arc<dyn Tagger> {
        self.entities.tagger()
    }

    /// Compute the features of one line.
    pub fn compute(
        &self,
        text: &str,
        topic_keywords: &[String],
        proper_nouns: &BTreeSet<String>,
    ) -> FeatureSet {
        let lower = text.to_lowercase();
        let words = word_tokens(&lower);
        let original_words = word_tokens(text);

        let mut features = FeatureSet {
            word_count: words.len(),
            sentence_count: sentences(text).len(),
            has_numbers: NUMBER.is_match(text),
            has_caps: ALL_CAPS.is_match(text),
            has_dates: DATE.is_match(text),
            ..FeatureSet::default()
        };

        if !words.is_empty() {
            let total_chars: usize = words.iter().map(|w| w.chars().count()).sum();
            features.avg_word_length = total_chars as f64 / words.len() as f64;

            let content = words
                .iter()
                .filter(|w| is_alpha(w) && !self.stopwords.is_stopword(w))
                .count();
            features.content_ratio = content as f64 / words.len() as f64;
        }

        if let Ok(tagged) = self.tagger().tag(&original_words) {
            if !tagged.is_empty() {
                let distinct: FxHashSet<_> = tagged.iter().map(|t| t.tag).collect();
                features.pos_diversity = distinct.len() as f64 / tagged.len() as f64;
            }
        }

        let line_nouns = self.entities.extract_or_empty(text);
        features.proper_noun_matches = line_nouns
            .iter()
            .filter(|pn| {
                let pn = pn.to_lowercase();
                proper_nouns.iter().any(|gpn| {
                    let gpn = gpn.to_lowercase();
                    pn.contains(&gpn) || gpn.contains(&pn)
                })
            })
            .count();

        features.topic_keyword_matches = topic_keywords
            .iter()
            .filter(|kw| lower.contains(&kw.to_lowercase()))
            .count();

        if !original_words.is_empty() {
            features.proper_noun_density =
                features.proper_noun_matches as f64 / original_words.len() as f64;
        }
        if !words.is_empty() {
            features.topic_keyword_density =
                features.topic_keyword_matches as f64 / words.len() as f64;
        }
        features.has_proper_nouns = features.proper_noun_matches > 0;
        features.has_topic_keywords = features.topic_keyword_matches > 0;

        features.is_irrelevant = self.detector.is_irrelevant(text, topic_keywords);
        features.topic_relevance_score =
            topic_relevance_score(text, topic_keywords, proper_nouns, &self.relevance);

        features
    }
}
