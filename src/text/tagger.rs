//! Part-of-speech tagging and entity chunking
//!
//! [`LexiconTagger`] assigns Penn Treebank tags from a closed-class lexicon,
//! capitalization and suffix rules. It is deterministic and needs no model
//! files. [`EntityChunker`] groups adjacent proper-noun tokens into entity
//! spans.
//!
//! Other taggers can be plugged in through the [`Tagger`] trait.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::Result;

/// Penn Treebank part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosTag {
    /// Noun, singular or mass
    Nn,
    /// Noun, plural
    Nns,
    /// Proper noun, singular
    Nnp,
    /// Proper noun, plural
    Nnps,
    Vb,
    Vbd,
    Vbg,
    Vbn,
    Vbp,
    Vbz,
    Jj,
    Jjr,
    Jjs,
    Rb,
    Dt,
    In,
    Cc,
    Cd,
    Prp,
    PrpPoss,
    Wdt,
    Wp,
    Wrb,
    Md,
    To,
    Ex,
    Pos,
    Uh,
    Sym,
    /// Sentence-final punctuation
    Period,
    Comma,
    Colon,
    OpenParen,
    CloseParen,
    Quote,
}

impl PosTag {
    /// Penn Treebank label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nn => "NN",
            Self::Nns => "NNS",
            Self::Nnp => "NNP",
            Self::Nnps => "NNPS",
            Self::Vb => "VB",
            Self::Vbd => "VBD",
            Self::Vbg => "VBG",
            Self::Vbn => "VBN",
            Self::Vbp => "VBP",
            Self::Vbz => "VBZ",
            Self::Jj => "JJ",
            Self::Jjr => "JJR",
            Self::Jjs => "JJS",
            Self::Rb => "RB",
            Self::Dt => "DT",
            Self::In => "IN",
            Self::Cc => "CC",
            Self::Cd => "CD",
            Self::Prp => "PRP",
            Self::PrpPoss => "PRP$",
            Self::Wdt => "WDT",
            Self::Wp => "WP",
            Self::Wrb => "WRB",
            Self::Md => "MD",
            Self::To => "TO",
            Self::Ex => "EX",
            Self::Pos => "POS",
            Self::Uh => "UH",
            Self::Sym => "SYM",
            Self::Period => ".",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::OpenParen => "(",
            Self::CloseParen => ")",
            Self::Quote => "''",
        }
    }

    #[must_use]
    pub fn is_proper_noun(&self) -> bool {
        matches!(self, Self::Nnp | Self::Nnps)
    }
}

/// A token with its assigned tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tagged {
    pub word: String,
    pub tag: PosTag,
}

/// Assigns part-of-speech tags to a tokenized sentence or line.
pub trait Tagger: Send + Sync {
    fn tag(&self, tokens: &[String]) -> Result<Vec<Tagged>>;
}

static LEXICON: LazyLock<HashMap<&'static str, PosTag>> = LazyLock::new(|| {
    use PosTag::*;
    let groups: &[(PosTag, &[&str])] = &[
        (
            Dt,
            &[
                "the", "a", "an", "this", "that", "these", "those", "every", "each", "some", "any",
                "no", "all", "both", "another", "either", "neither",
            ],
        ),
        (
            In,
            &[
                "of", "in", "on", "at", "by", "for", "with", "from", "into", "through", "during",
                "before", "after", "above", "below", "over", "under", "between", "against",
                "about", "among", "since", "until", "upon", "within", "without", "toward",
                "towards", "across", "along", "via", "despite", "than", "as", "because",
                "although", "though", "while", "if", "whether", "like", "throughout", "around",
                "beyond", "near", "onto", "per",
            ],
        ),
        (Cc, &["and", "or", "but", "nor", "yet", "plus"]),
        (
            Prp,
            &[
                "i", "me", "you", "he", "she", "it", "we", "they", "him", "us", "them", "myself",
                "yourself", "himself", "herself", "itself", "ourselves", "themselves",
            ],
        ),
        (PrpPoss, &["my", "your", "his", "her", "its", "our", "their"]),
        (Wdt, &["which", "whichever"]),
        (Wp, &["who", "whom", "what", "whoever", "whatever"]),
        (Wrb, &["when", "where", "why", "how", "whenever", "wherever"]),
        (
            Md,
            &["can", "could", "will", "would", "shall", "should", "may", "might", "must"],
        ),
        (To, &["to"]),
        (Vbz, &["is", "has", "does"]),
        (Vbp, &["are", "am", "have", "do"]),
        (Vbd, &["was", "were", "had", "did", "became", "began", "led", "took", "made"]),
        (Vb, &["be"]),
        (Vbn, &["been", "done", "given", "taken"]),
        (Vbg, &["being", "having"]),
        (
            Rb,
            &[
                "not", "n't", "very", "also", "too", "only", "just", "never", "always", "often",
                "still", "even", "then", "here", "now", "soon", "again", "already", "however",
                "thus", "therefore", "really", "so",
            ],
        ),
        (Jjr, &["more", "less", "better", "worse"]),
        (Jjs, &["most", "least", "best", "worst"]),
        (Uh, &["oh", "yes", "wow", "hey", "okay", "ok"]),
    ];

    let mut map = HashMap::new();
    for (tag, words) in groups {
        for word in *words {
            map.entry(*word).or_insert(*tag);
        }
    }
    map
});

const NOUN_SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "ness", "ity", "ism", "ist", "ance", "ence", "ship", "hood", "dom",
];
const ADJ_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "able", "ible", "al", "ic", "less", "ish", "ary", "ian",
];

/// Rule-based Penn Treebank tagger.
#[derive(Debug, Clone, Default)]
pub struct LexiconTagger;

impl LexiconTagger {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn tag_token(word: &str, prev: Option<&Tagged>) -> PosTag {
        if let Some(tag) = punctuation_tag(word) {
            return tag;
        }
        if is_number(word) {
            return PosTag::Cd;
        }

        let lower = word.to_lowercase();
        let sentence_initial = prev.map_or(true, |p| {
            matches!(p.tag, PosTag::Period | PosTag::Quote | PosTag::OpenParen | PosTag::Colon)
        });
        let capitalized = word.chars().next().is_some_and(char::is_uppercase);

        if lower == "'s" || lower == "’s" {
            return match prev.map(|p| p.tag) {
                Some(PosTag::Prp) => PosTag::Vbz,
                _ => PosTag::Pos,
            };
        }

        if !capitalized || sentence_initial || word == "I" {
            if let Some(tag) = LEXICON.get(lower.as_str()) {
                return *tag;
            }
        }

        if capitalized && word.chars().any(char::is_alphabetic) {
            let all_caps = word.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase);
            if all_caps && word.chars().count() > 1 {
                return PosTag::Nnp;
            }
            if !sentence_initial || !has_inflectional_suffix(&lower) {
                return if is_plural(&lower) && lower.len() > 4 {
                    PosTag::Nnps
                } else {
                    PosTag::Nnp
                };
            }
        }

        if !word.chars().any(char::is_alphanumeric) {
            return PosTag::Sym;
        }

        suffix_tag(&lower, prev)
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, tokens: &[String]) -> Result<Vec<Tagged>> {
        let mut tagged: Vec<Tagged> = Vec::with_capacity(tokens.len());
        for word in tokens {
            let tag = Self::tag_token(word, tagged.last());
            tagged.push(Tagged {
                word: word.clone(),
                tag,
            });
        }
        Ok(tagged)
    }
}

fn punctuation_tag(word: &str) -> Option<PosTag> {
    let tag = match word {
        "." | "!" | "?" => PosTag::Period,
        "," => PosTag::Comma,
        ":" | ";" | "-" | "--" | "..." | "…" => PosTag::Colon,
        "(" | "[" | "{" => PosTag::OpenParen,
        ")" | "]" | "}" => PosTag::CloseParen,
        "\"" | "'" | "“" | "”" | "‘" | "’" | "`" | "``" | "''" | "«" | "»" => PosTag::Quote,
        "%" | "$" | "&" | "#" | "+" | "=" | "/" => PosTag::Sym,
        _ => return None,
    };
    Some(tag)
}

fn is_number(word: &str) -> bool {
    word.chars().next().is_some_and(|c| c.is_ascii_digit())
        && word
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-' | '/' | ':'))
}

fn is_plural(lower: &str) -> bool {
    lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") && !lower.ends_with("is")
}

fn has_inflectional_suffix(lower: &str) -> bool {
    lower.len() > 4 && (lower.ends_with("ly") || lower.ends_with("ing"))
}

fn suffix_tag(lower: &str, prev: Option<&Tagged>) -> PosTag {
    let prev_tag = prev.map(|p| p.tag);
    let after_aux = prev.is_some_and(|p| {
        matches!(
            p.word.to_lowercase().as_str(),
            "has" | "have" | "had" | "was" | "were" | "is" | "are" | "been" | "be" | "being"
        )
    });

    if matches!(prev_tag, Some(PosTag::To | PosTag::Md)) && !lower.ends_with("ly") {
        return PosTag::Vb;
    }
    if lower.len() > 3 && lower.ends_with("ly") {
        return PosTag::Rb;
    }
    if lower.len() > 4 && lower.ends_with("ing") {
        return PosTag::Vbg;
    }
    if lower.len() > 3 && lower.ends_with("ed") {
        return if after_aux { PosTag::Vbn } else { PosTag::Vbd };
    }
    if lower.len() > 4 && lower.ends_with("est") {
        return PosTag::Jjs;
    }
    if NOUN_SUFFIXES.iter().any(|s| lower.len() > s.len() + 1 && lower.ends_with(s)) {
        return PosTag::Nn;
    }
    if ADJ_SUFFIXES.iter().any(|s| lower.len() > s.len() + 2 && lower.ends_with(s)) {
        return PosTag::Jj;
    }
    if lower.len() > 2 && is_plural(lower) {
        return if matches!(prev_tag, Some(PosTag::Prp | PosTag::Nnp)) {
            PosTag::Vbz
        } else {
            PosTag::Nns
        };
    }
    PosTag::Nn
}

/// A contiguous entity span over tagged tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    /// Token index of the first word
    pub start: usize,
    /// Token index one past the last word
    pub end: usize,
}

/// Groups adjacent proper nouns into named-entity spans.
#[derive(Debug, Clone)]
pub struct EntityChunker {
    max_length: usize,
}

impl Default for EntityChunker {
    fn default() -> Self {
        Self { max_length: 6 }
    }
}

impl EntityChunker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length.max(1);
        self
    }

    /// Extract maximal runs of `NNP`/`NNPS` tokens, split at `max_length`.
    #[must_use]
    pub fn chunk(&self, tagged: &[Tagged]) -> Vec<Entity> {
        let mut entities = Vec::new();
        let mut i = 0;

        while i < tagged.len() {
            if !tagged[i].tag.is_proper_noun() {
                i += 1;
                continue;
            }
            let start = i;
            while i < tagged.len() && tagged[i].tag.is_proper_noun() && i - start < self.max_length
            {
                i += 1;
            }
            let text = tagged[start..i]
                .iter()
                .map(|t| t.word.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            entities.push(Entity {
                text,
                start,
                end: i,
            });
        }

        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::word_tokens;

    fn tags(text: &str) -> Vec<(String, &'static str)> {
        LexiconTagger::new()
            .tag(&word_tokens(text))
            .unwrap()
            .into_iter()
            .map(|t| (t.word, t.tag.as_str()))
            .collect()
    }

    #[test]
    fn tags_proper_nouns_mid_sentence() {
        let t = tags("Then Napoleon Bonaparte crowned himself Emperor.");
        assert_eq!(t[0].1, "RB");
        assert_eq!(t[1].1, "NNP");
        assert_eq!(t[2].1, "NNP");
        assert_eq!(t[3].1, "VBD");
        assert_eq!(t[4].1, "PRP");
        assert_eq!(t[5].1, "NNP");
        assert_eq!(t[6].1, ".");
    }

    #[test]
    fn sentence_initial_function_words_use_lexicon() {
        let t = tags("The king fled. In 1791 he was arrested.");
        assert_eq!(t[0].1, "DT");
        assert_eq!(t[4].1, "IN");
        assert_eq!(t[5].1, "CD");
        assert_eq!(t[7].1, "VBD");
        assert_eq!(t[8].1, "VBN");
    }

    #[test]
    fn suffix_rules() {
        let t = tags("they quickly abolished feudal privileges and revolutionary institutions");
        assert_eq!(t[1].1, "RB");
        assert_eq!(t[2].1, "VBD");
        assert_eq!(t[3].1, "JJ");
        assert_eq!(t[4].1, "NNS");
        assert_eq!(t[5].1, "CC");
        assert_eq!(t[6].1, "JJ");
        assert_eq!(t[7].1, "NNS");
    }

    #[test]
    fn acronyms_are_proper_nouns() {
        let t = tags("The NATO alliance");
        assert_eq!(t[1].1, "NNP");
    }

    #[test]
    fn chunker_groups_adjacent_proper_nouns() {
        let tagged = LexiconTagger::new()
            .tag(&word_tokens("Then Napoleon Bonaparte met Joséphine in Paris."))
            .unwrap();
        let entities = EntityChunker::new().chunk(&tagged);
        let texts: Vec<_> = entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Napoleon Bonaparte", "Joséphine", "Paris"]);
        assert_eq!(entities[0].start, 1);
        assert_eq!(entities[0].end, 3);
    }

    #[test]
    fn chunker_respects_max_length() {
        let tagged = LexiconTagger::new()
            .tag(&word_tokens("and Alpha Beta Gamma Delta"))
            .unwrap();
        let entities = EntityChunker::new().with_max_length(2).chunk(&tagged);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].text, "Gamma Delta");
    }
}
