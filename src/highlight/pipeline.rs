//! Page scoring orchestration
//!
//! ```text
//! filter lines → document text → vocabulary → summary
//!   → per-line features ∥ similarity → boost → thresholds → rules → tiers
//! ```
//!
//! Per-line work runs on the rayon pool; thresholds wait for every line.

use std::ops::Range;
use std::time::Duration;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::boost::{content_boost, BoostConfig};
use super::context::DocumentContext;
use super::entities::EntityExtractor;
use super::features::{FeatureCalculator, FeatureSet, RelevanceConfig};
use super::keywords::KeywordConfig;
use super::rules::{enforce_rules, RuleConfig};
use super::similarity::{
    fuse_similarity, lexical_similarity, max_cosine, token_overlap, EmbeddingFailurePolicy,
    SimilarityBreakdown, SimilarityConfig,
};
use super::threshold::{compute_thresholds, ThresholdConfig};
use super::{HighlightError, PageOutcome, Result, ScoredLine, ScoredPage, Tier};
use crate::providers::{Embedder, ExtractiveSummarizer, Summarizer};
use crate::source::{filter_lines, ExtractedPage, ExtractionConfig, RawLine};
use crate::text::{clean_text, sentences, StopwordFilter};

/// Scoring settings; every section defaults to the reference constants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub extraction: ExtractionConfig,
    pub keywords: KeywordConfig,
    pub relevance: RelevanceConfig,
    #[serde(alias = "scoring")]
    pub similarity: SimilarityConfig,
    pub boost: BoostConfig,
    pub thresholds: ThresholdConfig,
    pub rules: RuleConfig,
}

/// Scores pages against their own content.
pub struct Highlighter {
    config: HighlightConfig,
    entities: EntityExtractor,
    features: FeatureCalculator,
    stopwords: StopwordFilter,
    summarizer: Box<dyn Summarizer>,
    fallback: ExtractiveSummarizer,
    embedder: Option<Box<dyn Embedder>>,
    timeout: Duration,
}

impl Highlighter {
    /// # Errors
    ///
    /// Returns [`HighlightError::Config`] if an irrelevance pattern is invalid.
    pub fn new(
        config: HighlightConfig,
        summarizer: Box<dyn Summarizer>,
        embedder: Option<Box<dyn Embedder>>,
    ) -> Result<Self> {
        let entities = EntityExtractor::default();
        let features = FeatureCalculator::new(entities.clone(), config.relevance.clone())?;
        Ok(Self {
            config,
            entities,
            features,
            stopwords: StopwordFilter::nltk(),
            summarizer,
            fallback: ExtractiveSummarizer::default(),
            embedder,
            timeout: Duration::from_secs(120),
        })
    }

    /// Bound each summarize / embed call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the default lexicon tagger used for proper nouns and POS features.
    pub fn with_entity_extractor(mut self, entities: EntityExtractor) -> Result<Self> {
        self.features = FeatureCalculator::new(entities.clone(), self.config.relevance.clone())?;
        self.entities = entities;
        Ok(self)
    }

    /// Sentences kept by the extractive fallback summary.
    #[must_use]
    pub fn with_fallback_sentences(mut self, sentences: usize) -> Self {
        self.fallback = ExtractiveSummarizer::new(sentences);
        self
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Filter a page and join its cleaned lines into the document text.
    ///
    /// Returns the early outcome when the page cannot be scored.
    fn prepare(&self, page: &ExtractedPage) -> std::result::Result<(Vec<RawLine>, String), PageOutcome> {
        let lines = filter_lines(page, &self.config.extraction);
        if lines.is_empty() {
            info!("No text lines found");
            return Err(PageOutcome::NoContent);
        }
        info!("Extracted {} text lines", lines.len());

        let full_text = lines
            .iter()
            .map(|l| clean_text(&l.text))
            .collect::<Vec<_>>()
            .join(" ");
        let chars = full_text.chars().count();
        if chars < self.config.extraction.min_document_chars {
            info!("Insufficient text content for analysis ({chars} chars)");
            return Err(PageOutcome::InsufficientContent { chars });
        }
        Ok((lines, full_text))
    }

    /// Document vocabulary only, without summary or scoring.
    pub fn vocabulary(&self, page: &ExtractedPage) -> std::result::Result<DocumentContext, PageOutcome> {
        let (_, full_text) = self.prepare(page)?;
        Ok(DocumentContext::with_vocabulary(
            full_text,
            &self.entities,
            &self.config.keywords,
        ))
    }

    /// Score every line of a page.
    ///
    /// # Errors
    ///
    /// Fails only when embeddings are required and unavailable
    /// ([`EmbeddingFailurePolicy::Fail`]). Empty or too-short pages are
    /// reported through [`ScoredPage::outcome`].
    pub async fn score(&self, page: &ExtractedPage) -> Result<ScoredPage> {
        let (lines, full_text) = match self.prepare(page) {
            Ok(prepared) => prepared,
            Err(outcome) => return Ok(ScoredPage::empty(outcome, page.width, page.height)),
        };

        let mut ctx = DocumentContext::with_vocabulary(full_text, &self.entities, &self.config.keywords);
        info!(
            "Found {} proper nouns, {} topic keywords",
            ctx.proper_nouns.len(),
            ctx.topic_keywords.len()
        );

        let summary = self.summarize(&ctx.full_text).await;
        ctx.set_summary(summary);
        info!("Summary ready: {} sentences", ctx.summary_sentences.len());

        let features: Vec<FeatureSet> = lines
            .par_iter()
            .map(|l| self.features.compute(&l.text, &ctx.topic_keywords, &ctx.proper_nouns))
            .collect();

        let line_sentences: Vec<Vec<String>> = lines
            .iter()
            .map(|l| sentences(&l.text).iter().map(|s| clean_text(s)).collect())
            .collect();
        let semantic = self
            .semantic_scores(&ctx.summary_sentences, &line_sentences)
            .await?;

        let similarity = &self.config.similarity;
        let breakdowns: Vec<SimilarityBreakdown> = lines
            .par_iter()
            .enumerate()
            .map(|(i, line)| {
                if line_sentences[i].is_empty() {
                    return SimilarityBreakdown::default();
                }
                SimilarityBreakdown {
                    semantic: semantic.as_ref().map(|s| s[i]),
                    lexical: lexical_similarity(
                        &line.text,
                        &ctx.summary_sentences,
                        similarity.lexical_max_features,
                    ),
                    overlap: token_overlap(&line.text, &ctx.summary_sentences, &self.stopwords),
                }
            })
            .collect();

        let mut scored: Vec<ScoredLine> = lines
            .into_iter()
            .zip(features)
            .zip(breakdowns)
            .map(|((line, features), parts)| {
                let similarity_score = fuse_similarity(&parts, similarity);
                let boosted_score = similarity_score + content_boost(&features, &self.config.boost);
                ScoredLine {
                    text: line.text,
                    bbox: line.bbox,
                    features,
                    similarity_score,
                    boosted_score,
                    final_score: boosted_score,
                    tier: Tier::Low,
                }
            })
            .collect();

        let boosted: Vec<f64> = scored.iter().map(|l| l.boosted_score).collect();
        let thresholds = compute_thresholds(&boosted, &self.config.thresholds);
        info!(
            "Thresholds: high >= {:.3}, medium >= {:.3}",
            thresholds.high, thresholds.medium
        );

        let enforcement = enforce_rules(&mut scored, &thresholds, &self.config.rules);
        info!(
            "Adjusted {} vocabulary lines, blocked {} irrelevant lines",
            enforcement.adjustments_made, enforcement.irrelevant_blocked
        );

        Ok(ScoredPage {
            outcome: PageOutcome::Scored,
            width: page.width,
            height: page.height,
            lines: scored,
            thresholds: Some(thresholds),
            enforcement,
            proper_nouns: ctx.proper_nouns.into_iter().collect(),
            topic_keywords: ctx.topic_keywords,
            summary: ctx.summary,
            semantic_similarity: semantic.is_some(),
        })
    }

    /// Abstractive summary, or the extractive fallback on failure, timeout
    /// or an empty result.
    async fn summarize(&self, text: &str) -> String {
        match timeout(self.timeout, self.summarizer.summarize(text)).await {
            Ok(Ok(summary)) if !sentences(&summary).is_empty() => {
                debug!("Summary from {}", self.summarizer.name());
                return summary;
            }
            Ok(Ok(_)) => warn!("{} returned an empty summary", self.summarizer.name()),
            Ok(Err(e)) => warn!("Summary generation failed: {e}"),
            Err(_) => warn!(
                "Summary generation timed out after {}s",
                self.timeout.as_secs()
            ),
        }
        info!("Using extractive summary");
        self.fallback.summarize_text(text)
    }

    /// Max cosine of each line's sentence embeddings against the summary.
    ///
    /// `Ok(None)` means similarity degrades to lexical + overlap.
    async fn semantic_scores(
        &self,
        summary: &[String],
        lines: &[Vec<String>],
    ) -> Result<Option<Vec<f64>>> {
        let Some(embedder) = &self.embedder else {
            return self.embedding_unavailable(HighlightError::Embedding(
                "no sentence embedder configured".to_string(),
            ));
        };

        let mut inputs: Vec<String> = summary.to_vec();
        let mut ranges: Vec<Range<usize>> = Vec::with_capacity(lines.len());
        for line in lines {
            let start = inputs.len();
            inputs.extend(line.iter().cloned());
            ranges.push(start..inputs.len());
        }

        let vectors = match timeout(self.timeout, embedder.embed(&inputs)).await {
            Ok(Ok(v)) if v.len() == inputs.len() => v,
            Ok(Ok(v)) => {
                return self.embedding_unavailable(HighlightError::Embedding(format!(
                    "{} returned {} vectors for {} sentences",
                    embedder.name(),
                    v.len(),
                    inputs.len()
                )))
            }
            Ok(Err(e)) => return self.embedding_unavailable(e),
            Err(_) => {
                return self.embedding_unavailable(HighlightError::Timeout {
                    operation: "embedding",
                    seconds: self.timeout.as_secs(),
                })
            }
        };
        debug!("Embedded {} sentences with {}", inputs.len(), embedder.name());

        let summary_vectors = &vectors[..summary.len()];
        Ok(Some(
            ranges
                .into_iter()
                .map(|r| max_cosine(&vectors[r], summary_vectors))
                .collect(),
        ))
    }

    fn embedding_unavailable(&self, error: HighlightError) -> Result<Option<Vec<f64>>> {
        match self.config.similarity.on_embedding_failure {
            EmbeddingFailurePolicy::Fail => Err(error),
            EmbeddingFailurePolicy::Degrade => {
                warn!("{error}; using lexical and overlap similarity only");
                Ok(None)
            }
        }
    }
}
