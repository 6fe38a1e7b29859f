//! Highlight report generation
//!
//! Generates machine-readable and human-readable reports from a scored page.

use serde::Serialize;
use std::fmt::Write as FmtWrite;
use std::path::Path;

use super::{PageOutcome, Result, ScoredLine, ScoredPage, Tier};

/// Lines listed in the "top lines" section.
const TOP_LINES: usize = 10;
/// Irrelevant lines listed as examples.
const IRRELEVANT_EXAMPLES: usize = 5;
/// Vocabulary entries shown per list.
const VOCABULARY_SAMPLE: usize = 5;

/// Report output format
#[derive(Debug, Clone, Copy, Default)]
pub enum ReportFormat {
    /// JSON (default, machine-readable)
    #[default]
    Json,
    /// Markdown (human-readable)
    Markdown,
}

/// Per-tier line counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierStats {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub irrelevant: usize,
    /// High lines carrying proper nouns or topic keywords
    pub vocabulary_high: usize,
    /// Medium lines carrying proper nouns or topic keywords
    pub vocabulary_medium: usize,
}

impl TierStats {
    pub fn from_page(page: &ScoredPage) -> Self {
        let mut stats = Self::default();
        for line in &page.lines {
            let vocab = line.features.has_proper_nouns || line.features.has_topic_keywords;
            match line.tier {
                Tier::High => {
                    stats.high += 1;
                    stats.vocabulary_high += usize::from(vocab);
                }
                Tier::Medium => {
                    stats.medium += 1;
                    stats.vocabulary_medium += usize::from(vocab);
                }
                Tier::Low => stats.low += 1,
            }
            stats.irrelevant += usize::from(line.features.is_irrelevant);
        }
        stats
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    page: &'a ScoredPage,
    stats: TierStats,
}

/// Highlight report generator
pub struct HighlightReport;

impl HighlightReport {
    /// Generate report in specified format
    pub fn generate(page: &ScoredPage, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => Self::to_json(page),
            ReportFormat::Markdown => Self::to_markdown(page),
        }
    }

    /// Save report to file
    pub fn save(page: &ScoredPage, format: ReportFormat, path: &Path) -> Result<()> {
        let content = Self::generate(page, format)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn to_json(page: &ScoredPage) -> Result<String> {
        let report = JsonReport {
            page,
            stats: TierStats::from_page(page),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    fn to_markdown(page: &ScoredPage) -> Result<String> {
        let mut md = String::new();

        writeln!(md, "# Highlight Report\n")?;

        match page.outcome {
            PageOutcome::NoContent => {
                writeln!(md, "No text lines found on this page.")?;
                return Ok(md);
            }
            PageOutcome::InsufficientContent { chars } => {
                writeln!(
                    md,
                    "Insufficient text content for analysis ({chars} characters)."
                )?;
                return Ok(md);
            }
            PageOutcome::Scored => {}
        }

        let stats = TierStats::from_page(page);
        writeln!(md, "## Summary\n")?;
        writeln!(md, "- **Lines**: {}", page.lines.len())?;
        writeln!(
            md,
            "- **High**: {} ({} with proper nouns/keywords)",
            stats.high, stats.vocabulary_high
        )?;
        writeln!(
            md,
            "- **Medium**: {} ({} with proper nouns/keywords)",
            stats.medium, stats.vocabulary_medium
        )?;
        writeln!(md, "- **Low**: {}", stats.low)?;
        writeln!(md, "- **Irrelevant**: {}", stats.irrelevant)?;
        let signals = if page.semantic_similarity {
            "semantic + lexical + overlap"
        } else {
            "lexical + overlap"
        };
        writeln!(md, "- **Similarity**: {signals}")?;

        if let Some(t) = page.thresholds {
            writeln!(md, "\n## Thresholds\n")?;
            writeln!(md, "- **High**: >= {:.3}", t.high)?;
            writeln!(md, "- **Medium**: >= {:.3}", t.medium)?;
            writeln!(
                md,
                "- **Rule enforcement**: {} raised, {} irrelevant blocked",
                page.enforcement.adjustments_made, page.enforcement.irrelevant_blocked
            )?;
        }

        writeln!(md, "\n## Vocabulary\n")?;
        writeln!(
            md,
            "- **Proper nouns** ({}): {}",
            page.proper_nouns.len(),
            sample(&page.proper_nouns)
        )?;
        writeln!(
            md,
            "- **Topic keywords** ({}): {}",
            page.topic_keywords.len(),
            sample(&page.topic_keywords)
        )?;

        if !page.summary.is_empty() {
            writeln!(md, "\n## Document Summary\n")?;
            writeln!(md, "> {}", page.summary)?;
        }

        writeln!(md, "\n## Top Lines\n")?;
        for (i, line) in top_lines(&page.lines, TOP_LINES).into_iter().enumerate() {
            writeln!(
                md,
                "{}. [{}] ({:.3}) [{}] {}",
                i + 1,
                line.tier.as_str().to_uppercase(),
                line.final_score,
                indicators(line).join(", "),
                preview(&line.text, 60)
            )?;
        }

        let irrelevant: Vec<_> = page
            .lines
            .iter()
            .filter(|l| l.features.is_irrelevant)
            .take(IRRELEVANT_EXAMPLES)
            .collect();
        if !irrelevant.is_empty() {
            writeln!(md, "\n## Irrelevant Content\n")?;
            for (i, line) in irrelevant.into_iter().enumerate() {
                writeln!(
                    md,
                    "{}. (R:{:.2}) {}",
                    i + 1,
                    line.features.topic_relevance_score,
                    preview(&line.text, 70)
                )?;
            }
        }

        Ok(md)
    }
}

/// The `n` highest-scoring lines, ties in page order.
pub fn top_lines(lines: &[ScoredLine], n: usize) -> Vec<&ScoredLine> {
    let mut sorted: Vec<&ScoredLine> = lines.iter().collect();
    sorted.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    sorted.truncate(n);
    sorted
}

/// `PN:n`, `TK:n`, `IRRELEVANT` and the relevance score.
pub fn indicators(line: &ScoredLine) -> Vec<String> {
    let f = &line.features;
    let mut out = Vec::new();
    if f.has_proper_nouns {
        out.push(format!("PN:{}", f.proper_noun_matches));
    }
    if f.has_topic_keywords {
        out.push(format!("TK:{}", f.topic_keyword_matches));
    }
    if f.is_irrelevant {
        out.push("IRRELEVANT".to_string());
    }
    out.push(format!("R:{:.2}", f.topic_relevance_score));
    out
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn sample(items: &[String]) -> String {
    if items.is_empty() {
        return "none".to_string();
    }
    items
        .iter()
        .take(VOCABULARY_SAMPLE)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{EnforcementStats, FeatureSet, Thresholds};
    use crate::source::BBox;

    fn line(text: &str, score: f64, tier: Tier, features: FeatureSet) -> ScoredLine {
        ScoredLine {
            text: text.to_string(),
            bbox: BBox::new(0.0, 0.0, 100.0, 12.0),
            features,
            similarity_score: score,
            boosted_score: score,
            final_score: score,
            tier,
        }
    }

    fn sample_page() -> ScoredPage {
        ScoredPage {
            outcome: PageOutcome::Scored,
            width: 612.0,
            height: 792.0,
            lines: vec![
                line(
                    "The French Revolution began in 1789.",
                    0.8,
                    Tier::High,
                    FeatureSet {
                        has_proper_nouns: true,
                        proper_noun_matches: 2,
                        has_topic_keywords: true,
                        topic_keyword_matches: 1,
                        topic_relevance_score: 0.45,
                        ..FeatureSet::default()
                    },
                ),
                line(
                    "I really like pizza on Fridays.",
                    0.1,
                    Tier::Low,
                    FeatureSet {
                        is_irrelevant: true,
                        ..FeatureSet::default()
                    },
                ),
                line("A plain middle line of text.", 0.45, Tier::Medium, FeatureSet::default()),
            ],
            thresholds: Some(Thresholds {
                medium: 0.4,
                high: 0.7,
            }),
            enforcement: EnforcementStats {
                adjustments_made: 1,
                irrelevant_blocked: 0,
            },
            proper_nouns: vec!["French".to_string(), "Revolution".to_string()],
            topic_keywords: vec!["revolution".to_string()],
            summary: "The French Revolution began.".to_string(),
            semantic_similarity: true,
        }
    }

    #[test]
    fn test_json_generation() {
        let json = HighlightReport::generate(&sample_page(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["outcome"]["status"], "scored");
        assert_eq!(value["stats"]["high"], 1);
        assert_eq!(value["stats"]["irrelevant"], 1);
        assert_eq!(value["lines"][0]["tier"], "high");
        assert_eq!(value["lines"][0]["bbox"][2], 100.0);
    }

    #[test]
    fn test_markdown_generation() {
        let md = HighlightReport::generate(&sample_page(), ReportFormat::Markdown).unwrap();
        assert!(md.contains("# Highlight Report"));
        assert!(md.contains("- **High**: 1 (1 with proper nouns/keywords)"));
        assert!(md.contains("1. [HIGH] (0.800) [PN:2, TK:1, R:0.45] The French Revolution"));
        assert!(md.contains("2. [MEDIUM] (0.450) [R:0.00]"));
        assert!(md.contains("## Irrelevant Content"));
        assert!(md.contains("1. (R:0.00) I really like pizza on Fridays."));
    }

    #[test]
    fn test_markdown_for_unscored_page() {
        let page = ScoredPage::empty(PageOutcome::InsufficientContent { chars: 42 }, 612.0, 792.0);
        let md = HighlightReport::generate(&page, ReportFormat::Markdown).unwrap();
        assert!(md.contains("42 characters"));
        assert!(!md.contains("## Top Lines"));
    }

    #[test]
    fn test_preview_truncates_on_chars() {
        assert_eq!(preview("short", 60), "short");
        let long = "é".repeat(80);
        let p = preview(&long, 70);
        assert_eq!(p.chars().count(), 73);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_top_lines_order() {
        let page = sample_page();
        let top = top_lines(&page.lines, 2);
        assert_eq!(top.len(), 2);
        assert!((top[0].final_score - 0.8).abs() < f64::EPSILON);
        assert!((top[1].final_score - 0.45).abs() < f64::EPSILON);
    }
}
