//! Document-level context shared by every line of a page.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::entities::EntityExtractor;
use super::keywords::{extract_topic_keywords, KeywordConfig};
use crate::text::sentences;

/// Vocabulary and summary of the whole page.
#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    pub full_text: String,
    pub proper_nouns: BTreeSet<String>,
    /// Strongest first
    pub topic_keywords: Vec<String>,
    pub summary: String,
    pub summary_sentences: Vec<String>,
}

impl DocumentContext {
    /// Extract the document vocabulary. Failures degrade to empty sets.
    pub fn with_vocabulary(
        full_text: String,
        entities: &EntityExtractor,
        keywords: &KeywordConfig,
    ) -> Self {
        let proper_nouns = entities.extract_or_empty(&full_text);
        let topic_keywords = extract_topic_keywords(&full_text, keywords).unwrap_or_else(|e| {
            warn!("Topic keyword extraction failed: {e}");
            Vec::new()
        });
        debug!(
            "Vocabulary: {} proper nouns, {} topic keywords",
            proper_nouns.len(),
            topic_keywords.len()
        );

        Self {
            full_text,
            proper_nouns,
            topic_keywords,
            ..Self::default()
        }
    }

    /// Attach the summary, splitting it into sentences.
    pub fn set_summary(&mut self, summary: String) {
        self.summary_sentences = sentences(&summary);
        self.summary = summary;
    }
}
