//! Adaptive tier thresholds
//!
//! Thresholds come from the distribution of boosted scores on the page,
//! with absolute floors so a uniformly weak page is not highlighted:
//!
//! ```text
//! high   = max(p80, mean + 0.8 * std, 0.6)
//! medium = max(p50, mean + 0.3 * std, 0.3)
//! high   = max(high, medium + 0.1)
//! ```
//!
//! `std` is the population standard deviation; percentiles interpolate
//! linearly between closest ranks. The gap holds as `high >= medium + gap`
//! in floating point; the difference `high - medium` may round a few ulps
//! below `gap`.

use serde::{Deserialize, Serialize};

use super::Tier;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub high_percentile: f64,
    pub high_std_factor: f64,
    pub high_floor: f64,
    pub medium_percentile: f64,
    pub medium_std_factor: f64,
    pub medium_floor: f64,
    /// Minimum separation between the two thresholds
    pub min_gap: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            high_percentile: 80.0,
            high_std_factor: 0.8,
            high_floor: 0.6,
            medium_percentile: 50.0,
            medium_std_factor: 0.3,
            medium_floor: 0.3,
            min_gap: 0.1,
        }
    }
}

/// Tier boundaries for one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub medium: f64,
    pub high: f64,
}

impl Thresholds {
    /// `high` if `score >= high`, `medium` if `score >= medium`, else `low`.
    pub fn tier_for(&self, score: f64) -> Tier {
        if score >= self.high {
            Tier::High
        } else if score >= self.medium {
            Tier::Medium
        } else {
            Tier::Low
        }
    }
}

/// Compute thresholds from a page's boosted scores.
///
/// An empty slice yields the floors.
pub fn compute_thresholds(scores: &[f64], config: &ThresholdConfig) -> Thresholds {
    if scores.is_empty() {
        return separated(config.medium_floor, config.high_floor, config.min_gap);
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let std = (sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt();

    let high = percentile(&sorted, config.high_percentile)
        .max(mean + config.high_std_factor * std)
        .max(config.high_floor);
    let medium = percentile(&sorted, config.medium_percentile)
        .max(mean + config.medium_std_factor * std)
        .max(config.medium_floor);

    separated(medium, high, config.min_gap)
}

/// Guarantees `high >= medium + min_gap` exactly as computed.
fn separated(medium: f64, high: f64, min_gap: f64) -> Thresholds {
    Thresholds {
        medium,
        high: high.max(medium + min_gap),
    }
}

/// Linear-interpolation percentile over sorted, non-empty data.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&data, 50.0) - 3.0).abs() < 1e-12);
        assert!((percentile(&data, 80.0) - 4.2).abs() < 1e-12);
        assert!((percentile(&[7.0], 80.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn floors_apply_to_weak_pages() {
        let t = compute_thresholds(&[0.1, 0.12, 0.15, 0.2], &ThresholdConfig::default());
        assert!((t.medium - 0.3).abs() < 1e-12);
        assert!((t.high - 0.6).abs() < 1e-12);
    }

    #[test]
    fn uniform_scores_enforce_the_gap() {
        let t = compute_thresholds(&[0.9; 6], &ThresholdConfig::default());
        assert!((t.medium - 0.9).abs() < 1e-12);
        assert!((t.high - 1.0).abs() < 1e-12);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn gap_holds_when_medium_sits_on_the_percentile() {
        let config = ThresholdConfig::default();
        for scores in [vec![0.5; 3], vec![0.75; 4]] {
            let t = compute_thresholds(&scores, &config);
            assert_eq!(t.medium, scores[0]);
            assert_eq!(t.high, t.medium + config.min_gap);
            assert!(t.high >= t.medium + config.min_gap);
        }
    }

    #[test]
    fn thresholds_track_distribution() {
        let scores = [0.2, 0.4, 0.6, 0.8, 1.0];
        let t = compute_thresholds(&scores, &ThresholdConfig::default());
        // mean 0.6, population std sqrt(0.08)
        let std = 0.08f64.sqrt();
        assert!((t.high - (0.6 + 0.8 * std).max(0.84)).abs() < 1e-12);
        assert!((t.medium - (0.6 + 0.3 * std)).abs() < 1e-12);
        assert!(t.high >= t.medium + 0.1);
    }

    #[test]
    fn tiers_use_inclusive_bounds() {
        let t = Thresholds {
            medium: 0.4,
            high: 0.7,
        };
        assert_eq!(t.tier_for(0.7), Tier::High);
        assert_eq!(t.tier_for(0.4), Tier::Medium);
        assert_eq!(t.tier_for(0.39), Tier::Low);
    }

    #[test]
    fn empty_scores_yield_floors() {
        let t = compute_thresholds(&[], &ThresholdConfig::default());
        assert!((t.medium - 0.3).abs() < 1e-12);
        assert!((t.high - 0.6).abs() < 1e-12);
    }
}
