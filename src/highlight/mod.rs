//! Line-importance scoring pipeline
//!
//! Scores every extracted line of a page for how central it is to the
//! document, then assigns a highlight tier:
//! - Document vocabulary (proper nouns, TF-IDF topic keywords)
//! - Abstractive summary as the reference context
//! - Per-line features and irrelevance detection
//! - Semantic + lexical + token-overlap similarity fusion
//! - Content boosts, adaptive thresholds and rule enforcement

pub mod boost;
pub mod context;
pub mod entities;
pub mod features;
pub mod keywords;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod similarity;
pub mod threshold;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::BBox;

pub use boost::{content_boost, BoostConfig};
pub use context::DocumentContext;
pub use entities::{extract_proper_nouns, EntityExtractor};
pub use features::{
    compute_features, detect_irrelevant, topic_relevance_score, FeatureCalculator, FeatureSet,
    IrrelevanceDetector, RelevanceConfig,
};
pub use keywords::{extract_topic_keywords, KeywordConfig};
pub use pipeline::{HighlightConfig, Highlighter};
pub use report::{HighlightReport, ReportFormat};
pub use rules::{enforce_rules, EnforcementStats, RuleConfig};
pub use similarity::{
    fuse_similarity, lexical_similarity, max_cosine, token_overlap, EmbeddingFailurePolicy,
    SimilarityBreakdown, SimilarityConfig,
};
pub use threshold::{compute_thresholds, ThresholdConfig, Thresholds};

/// Highlighting errors
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Summary error: {0}")]
    Summary(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, HighlightError>;

/// Highlight tier assigned to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scored line of a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredLine {
    pub text: String,
    pub bbox: BBox,
    pub features: FeatureSet,
    /// Fused similarity to the summary, in [0, 1]
    pub similarity_score: f64,
    /// Similarity plus content boost, before rule enforcement
    pub boosted_score: f64,
    /// Score after rule enforcement; the tier is derived from this
    pub final_score: f64,
    pub tier: Tier,
}

/// How scoring of a page ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    /// Lines were scored and tiered
    Scored,
    /// No line survived extraction filtering
    NoContent,
    /// The joined document text was too short to analyze
    InsufficientContent { chars: usize },
}

/// Result of scoring one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPage {
    pub outcome: PageOutcome,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<ScoredLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
    pub enforcement: EnforcementStats,
    pub proper_nouns: Vec<String>,
    pub topic_keywords: Vec<String>,
    pub summary: String,
    /// False when similarity fell back to lexical + overlap only
    pub semantic_similarity: bool,
}

impl ScoredPage {
    /// A page that ended before scoring.
    pub fn empty(outcome: PageOutcome, width: f32, height: f32) -> Self {
        Self {
            outcome,
            width,
            height,
            lines: Vec::new(),
            thresholds: None,
            enforcement: EnforcementStats::default(),
            proper_nouns: Vec::new(),
            topic_keywords: Vec::new(),
            summary: String::new(),
            semantic_similarity: false,
        }
    }

    /// Number of lines in a tier.
    pub fn count(&self, tier: Tier) -> usize {
        self.lines.iter().filter(|l| l.tier == tier).count()
    }

    /// Number of lines flagged as irrelevant.
    pub fn irrelevant_count(&self) -> usize {
        self.lines.iter().filter(|l| l.features.is_irrelevant).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_order_low_to_high() {
        assert!(Tier::Low < Tier::Medium);
        assert!(Tier::Medium < Tier::High);
        assert_eq!(Tier::High.to_string(), "high");
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&PageOutcome::InsufficientContent { chars: 42 }).unwrap();
        assert_eq!(json, r#"{"status":"insufficient_content","chars":42}"#);
    }

    #[test]
    fn empty_page_has_no_lines() {
        let page = ScoredPage::empty(PageOutcome::NoContent, 612.0, 792.0);
        assert!(page.lines.is_empty());
        assert_eq!(page.count(Tier::High), 0);
        assert!(page.thresholds.is_none());
    }
}
