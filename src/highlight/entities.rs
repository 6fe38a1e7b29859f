//! Proper-noun extraction
//!
//! A proper noun is any of:
//! - a token tagged `NNP`/`NNPS`
//! - the text of a named-entity chunk
//! - a capitalized alphabetic token longer than two characters
//!
//! Extraction failures yield an empty set; they never abort scoring.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use crate::text::{self, is_alpha, word_tokens, EntityChunker, LexiconTagger, Tagger};

/// Extracts proper nouns with a pluggable tagger.
#[derive(Clone)]
pub struct EntityExtractor {
    tagger: Arc<dyn Tagger>,
    chunker: EntityChunker,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(Arc::new(LexiconTagger::new()))
    }
}

impl EntityExtractor {
    pub fn new(tagger: Arc<dyn Tagger>) -> Self {
        Self {
            tagger,
            chunker: EntityChunker::default(),
        }
    }

    pub fn tagger(&self) -> &Arc<dyn Tagger> {
        &self.tagger
    }

    /// Extract the proper-noun set of `text`.
    pub fn extract(&self, text: &str) -> text::Result<BTreeSet<String>> {
        let tokens = word_tokens(text);
        let tagged = self.tagger.tag(&tokens)?;

        let mut nouns: BTreeSet<String> = tagged
            .iter()
            .filter(|t| t.tag.is_proper_noun())
            .map(|t| t.word.clone())
            .collect();

        nouns.extend(self.chunker.chunk(&tagged).into_iter().map(|e| e.text));

        nouns.extend(
            tokens
                .iter()
                .filter(|w| is_capitalized_word(w))
                .cloned(),
        );

        Ok(nouns)
    }

    /// Like [`extract`](Self::extract), logging and returning an empty set on failure.
    pub fn extract_or_empty(&self, text: &str) -> BTreeSet<String> {
        self.extract(text).unwrap_or_else(|e| {
            warn!("Proper noun extraction failed: {e}");
            BTreeSet::new()
        })
    }
}

/// Extract proper nouns with the built-in lexicon tagger.
pub fn extract_proper_nouns(text: &str) -> BTreeSet<String> {
    EntityExtractor::default().extract_or_empty(text)
}

fn is_capitalized_word(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
        && word.chars().count() > 2
        && is_alpha(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{Tagged, TextError};

    struct FailingTagger;

    impl Tagger for FailingTagger {
        fn tag(&self, _tokens: &[String]) -> text::Result<Vec<Tagged>> {
            Err(TextError::Tagger("model unavailable".to_string()))
        }
    }

    #[test]
    fn finds_names_and_multiword_entities() {
        let nouns = extract_proper_nouns("Napoleon Bonaparte crowned himself Emperor in 1804.");
        assert!(nouns.contains("Napoleon"));
        assert!(nouns.contains("Bonaparte"));
        assert!(nouns.contains("Napoleon Bonaparte"));
        assert!(nouns.contains("Emperor"));
        assert!(!nouns.contains("1804"));
    }

    #[test]
    fn capitalized_words_need_three_letters() {
        assert!(is_capitalized_word("Bob"));
        assert!(!is_capitalized_word("Al"));
        assert!(!is_capitalized_word("U.S."));
        assert!(!is_capitalized_word("paris"));

        let nouns = extract_proper_nouns("we met Bob in Paris");
        assert!(nouns.contains("Bob"));
        assert!(nouns.contains("Paris"));
    }

    #[test]
    fn lowercase_text_has_no_proper_nouns() {
        assert!(extract_proper_nouns("the weather was pleasant and mild").is_empty());
        assert!(extract_proper_nouns("").is_empty());
    }

    #[test]
    fn tagger_failure_yields_empty_set() {
        let extractor = EntityExtractor::new(Arc::new(FailingTagger));
        assert!(extractor.extract("Napoleon").is_err());
        assert!(extractor.extract_or_empty("Napoleon").is_empty());
    }
}
