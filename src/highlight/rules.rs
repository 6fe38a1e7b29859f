//! Rule enforcement
//!
//! Lines carrying document vocabulary are lifted to at least medium tier,
//! unless they were flagged irrelevant. Scores are only ever raised.

use serde::{Deserialize, Serialize};

use super::threshold::Thresholds;
use super::ScoredLine;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Lifted lines land this far above the medium threshold
    pub medium_margin: f64,
    /// Extra lift for lines with both proper nouns and topic keywords
    pub dual_signal_bonus: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            medium_margin: 0.05,
            dual_signal_bonus: 0.05,
        }
    }
}

/// Counters from one enforcement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementStats {
    /// Lines whose score was raised
    pub adjustments_made: usize,
    /// Eligible lines left alone because they were irrelevant
    pub irrelevant_blocked: usize,
}

/// Raise under-scored vocabulary lines and re-tier every line.
pub fn enforce_rules(
    lines: &mut [ScoredLine],
    thresholds: &Thresholds,
    config: &RuleConfig,
) -> EnforcementStats {
    let mut stats = EnforcementStats::default();

    for line in lines.iter_mut() {
        let f = &line.features;
        let eligible = f.has_proper_nouns || f.has_topic_keywords;

        if eligible && line.final_score < thresholds.medium {
            if f.is_irrelevant {
                stats.irrelevant_blocked += 1;
            } else {
                let mut lifted = line.final_score.max(thresholds.medium + config.medium_margin);
                if f.has_proper_nouns && f.has_topic_keywords {
                    lifted += config.dual_signal_bonus;
                }
                line.final_score = lifted;
                stats.adjustments_made += 1;
            }
        }

        line.tier = thresholds.tier_for(line.final_score);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{FeatureSet, Tier};
    use crate::source::BBox;

    fn line(score: f64, nouns: bool, keywords: bool, irrelevant: bool) -> ScoredLine {
        ScoredLine {
            text: "line".to_string(),
            bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
            features: FeatureSet {
                has_proper_nouns: nouns,
                has_topic_keywords: keywords,
                is_irrelevant: irrelevant,
                ..FeatureSet::default()
            },
            similarity_score: score,
            boosted_score: score,
            final_score: score,
            tier: Tier::Low,
        }
    }

    const T: Thresholds = Thresholds {
        medium: 0.4,
        high: 0.7,
    };

    #[test]
    fn vocabulary_lines_are_lifted_to_medium() {
        let mut lines = vec![line(0.1, true, false, false)];
        let stats = enforce_rules(&mut lines, &T, &RuleConfig::default());
        assert!((lines[0].final_score - 0.45).abs() < 1e-12);
        assert_eq!(lines[0].tier, Tier::Medium);
        assert_eq!(stats.adjustments_made, 1);
    }

    #[test]
    fn dual_signal_gets_extra_lift() {
        let mut lines = vec![line(0.1, true, true, false)];
        enforce_rules(&mut lines, &T, &RuleConfig::default());
        assert!((lines[0].final_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn irrelevant_lines_are_blocked() {
        let mut lines = vec![line(0.1, true, true, true)];
        let stats = enforce_rules(&mut lines, &T, &RuleConfig::default());
        assert!((lines[0].final_score - 0.1).abs() < 1e-12);
        assert_eq!(lines[0].tier, Tier::Low);
        assert_eq!(stats.irrelevant_blocked, 1);
        assert_eq!(stats.adjustments_made, 0);
    }

    #[test]
    fn lines_without_vocabulary_or_above_medium_are_untouched() {
        let mut lines = vec![line(0.1, false, false, false), line(0.8, true, true, false)];
        let stats = enforce_rules(&mut lines, &T, &RuleConfig::default());
        assert!((lines[0].final_score - 0.1).abs() < 1e-12);
        assert_eq!(lines[1].tier, Tier::High);
        assert_eq!(stats, EnforcementStats::default());
    }

    #[test]
    fn scores_never_decrease() {
        let mut lines: Vec<_> = [0.0, 0.2, 0.39, 0.41, 0.9]
            .iter()
            .map(|&s| line(s, true, true, false))
            .collect();
        let before: Vec<f64> = lines.iter().map(|l| l.final_score).collect();
        enforce_rules(&mut lines, &T, &RuleConfig::default());
        for (l, b) in lines.iter().zip(before) {
            assert!(l.final_score >= b);
        }
    }
}
