//! Text analysis substrate shared by every scoring stage.
//!
//! Provides treebank-style word tokenization, sentence splitting, line
//! cleanup, stopword lists, a lexicon-driven part-of-speech tagger with an
//! entity chunker, and a TF-IDF vectorizer.
//!
//! # Pipeline
//!
//! ```text
//! raw line → clean_text → sentences → word_tokens → tagger / tfidf
//! ```

pub mod stopwords;
pub mod tagger;
pub mod tfidf;

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub use stopwords::StopwordFilter;
pub use tagger::{EntityChunker, LexiconTagger, PosTag, Tagged, Tagger};
pub use tfidf::{TfidfConfig, TfidfMatrix, TfidfVectorizer};

/// Recoverable text-analysis failures.
///
/// Callers in the scoring pipeline treat every variant as "no signal"
/// and substitute an empty result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextError {
    #[error("empty vocabulary; documents contain only stop words or no terms")]
    EmptyVocabulary,

    #[error("max_df corresponds to {max_docs:.1} documents, fewer than min_df ({min_docs})")]
    InvalidDocumentFrequency { max_docs: f64, min_docs: usize },

    #[error("tagger error: {0}")]
    Tagger(String),
}

pub type Result<T> = std::result::Result<T, TextError>;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static TRAILING_PAGE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}\b$").expect("valid regex"));
static PUNCTUATION_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\w\s]*$").expect("valid regex"));

/// Abbreviations that end in a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "cf", "al",
    "no", "vol", "fig", "gen", "gov", "col", "lt", "sgt", "capt", "rev", "mt", "ft", "jan", "feb",
    "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "inc", "ltd", "co",
    "corp", "u.s", "u.k", "a.m", "p.m", "c", "ca",
];

/// Contraction suffixes split off as their own token.
const CONTRACTIONS: &[&str] = &["n't", "'s", "'re", "'ll", "'ve", "'d", "'m", "’s"];

const LEADING_PUNCT: &[char] = &['"', '\'', '(', '[', '{', '“', '‘', '«', '`'];
const TRAILING_PUNCT: &[char] = &[
    '"', '\'', ')', ']', '}', ',', ';', ':', '!', '?', '.', '”', '’', '»', '%', '…',
];

/// Normalize an extracted line.
///
/// Collapses whitespace, drops a trailing standalone page number (1-3 digits)
/// and blanks lines made only of punctuation.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    let collapsed = collapsed.trim();
    let without_page = TRAILING_PAGE_NUMBER.replace(collapsed, "");
    let cleaned = PUNCTUATION_ONLY.replace(&without_page, "");
    cleaned.trim_end().to_string()
}

/// True when `word` is non-empty and every char is alphabetic.
#[must_use]
pub fn is_alpha(word: &str) -> bool {
    !word.is_empty() && word.chars().all(char::is_alphabetic)
}

/// Split text into sentences.
///
/// A sentence ends at `.`, `!` or `?` (plus any closing quotes/brackets)
/// when followed by whitespace and a character that is not lowercase.
/// Known abbreviations and single-letter initials do not end a sentence.
#[must_use]
pub fn sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if matches!(c, '.' | '!' | '?') {
            let mut end = i + 1;
            while end < chars.len() && matches!(chars[end], '.' | '!' | '?') {
                end += 1;
            }
            while end < chars.len() && matches!(chars[end], '"' | '\'' | ')' | ']' | '”' | '’') {
                end += 1;
            }

            let at_text_end = end >= chars.len();
            let followed_by_space = !at_text_end && chars[end].is_whitespace();

            if followed_by_space && !(c == '.' && is_abbreviation(&chars[start..i])) {
                let next = chars[end..].iter().find(|ch| !ch.is_whitespace());
                if next.is_some_and(|ch| !ch.is_lowercase()) {
                    push_sentence(&mut out, &chars[start..end]);
                    start = end;
                }
            }
            i = end;
            continue;
        }
        i += 1;
    }

    if start < chars.len() {
        push_sentence(&mut out, &chars[start..]);
    }

    out
}

fn push_sentence(out: &mut Vec<String>, chars: &[char]) {
    let sentence: String = chars.iter().collect();
    let trimmed = sentence.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// Check whether the word immediately before a period is an abbreviation.
fn is_abbreviation(before: &[char]) -> bool {
    let word: String = before
        .iter()
        .rev()
        .take_while(|c| !c.is_whitespace())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let word = word.trim_start_matches(LEADING_PUNCT);

    if word.chars().count() == 1 && word.chars().all(char::is_uppercase) {
        return true;
    }

    let lower = word.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}

/// Treebank-style word tokenization.
///
/// Splits on whitespace, separates leading/trailing punctuation and common
/// English contractions. Internal hyphens, apostrophes and numeric
/// separators (`1,000`, `3.5`) stay inside their token.
#[must_use]
pub fn word_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for chunk in text.split_whitespace() {
        let mut rest = chunk;

        while let Some(c) = rest.chars().next() {
            if LEADING_PUNCT.contains(&c) && rest.chars().count() > 1 {
                tokens.push(c.to_string());
                rest = &rest[c.len_utf8()..];
            } else {
                break;
            }
        }

        let mut trailing = Vec::new();
        loop {
            let Some(c) = rest.chars().last() else { break };
            if !TRAILING_PUNCT.contains(&c) {
                break;
            }
            if c == '.' && keeps_final_period(rest) {
                break;
            }
            trailing.push(c.to_string());
            rest = &rest[..rest.len() - c.len_utf8()];
        }

        if !rest.is_empty() {
            split_contraction(rest, &mut tokens);
        }
        tokens.extend(trailing.into_iter().rev());
    }

    tokens
}

/// Abbreviations and initials like `e.g.` / `U.S.` keep their final period.
fn keeps_final_period(word: &str) -> bool {
    let stem = &word[..word.len() - 1];
    if stem.is_empty() {
        return false;
    }
    if stem.contains('.') && stem.chars().all(|c| c.is_alphabetic() || c == '.') {
        return true;
    }
    ABBREVIATIONS.contains(&stem.to_lowercase().as_str()) && stem.chars().count() > 1
}

fn split_contraction(word: &str, tokens: &mut Vec<String>) {
    let lower = word.to_lowercase();
    for suffix in CONTRACTIONS {
        if lower.ends_with(suffix) && lower.len() > suffix.len() {
            let cut = word.len() - suffix.len();
            if word.is_char_boundary(cut) {
                tokens.push(word[..cut].to_string());
                tokens.push(word[cut..].to_string());
                return;
            }
        }
    }
    tokens.push(word.to_string());
}
