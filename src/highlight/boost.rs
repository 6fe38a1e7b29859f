//! Content boost added on top of the similarity score.

use serde::{Deserialize, Serialize};

use super::features::FeatureSet;

/// Boost amounts and the feature thresholds that trigger them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    pub long_line_words: usize,
    pub long_line_boost: f64,
    pub very_long_line_words: usize,
    pub very_long_line_boost: f64,
    pub content_ratio_min: f64,
    pub content_ratio_boost: f64,
    pub pos_diversity_min: f64,
    pub pos_diversity_boost: f64,
    pub numbers_boost: f64,
    pub dates_boost: f64,
    pub caps_boost: f64,
    pub proper_noun_base: f64,
    pub proper_noun_density_weight: f64,
    pub topic_keyword_base: f64,
    pub topic_keyword_density_weight: f64,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            long_line_words: 15,
            long_line_boost: 0.05,
            very_long_line_words: 25,
            very_long_line_boost: 0.05,
            content_ratio_min: 0.6,
            content_ratio_boost: 0.03,
            pos_diversity_min: 0.3,
            pos_diversity_boost: 0.03,
            numbers_boost: 0.02,
            dates_boost: 0.02,
            caps_boost: 0.01,
            proper_noun_base: 0.15,
            proper_noun_density_weight: 0.2,
            topic_keyword_base: 0.12,
            topic_keyword_density_weight: 0.15,
        }
    }
}

/// Sum of all applicable boosts. Always non-negative.
pub fn content_boost(features: &FeatureSet, config: &BoostConfig) -> f64 {
    let mut boost = 0.0;

    if features.word_count > config.long_line_words {
        boost += config.long_line_boost;
    }
    if features.word_count > config.very_long_line_words {
        boost += config.very_long_line_boost;
    }
    if features.content_ratio > config.content_ratio_min {
        boost += config.content_ratio_boost;
    }
    if features.pos_diversity > config.pos_diversity_min {
        boost += config.pos_diversity_boost;
    }
    if features.has_numbers {
        boost += config.numbers_boost;
    }
    if features.has_dates {
        boost += config.dates_boost;
    }
    if features.has_caps {
        boost += config.caps_boost;
    }
    if features.has_proper_nouns {
        boost += config.proper_noun_base
            + features.proper_noun_density * config.proper_noun_density_weight;
    }
    if features.has_topic_keywords {
        boost += config.topic_keyword_base
            + features.topic_keyword_density * config.topic_keyword_density_weight;
    }

    boost
}
