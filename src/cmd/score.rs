use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use pagelight::highlight::{HighlightReport, PageOutcome, Tier};
use pagelight::Config;

use crate::OutputFormat;

pub async fn cmd_score(
    config: &Config,
    input: &Path,
    page: usize,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let (_, _, extracted) = super::load_page(input, page)?;
    eprintln!("📄 Scoring: {} (page {page})", input.display());

    let highlighter = config.highlighter()?;
    let start = Instant::now();
    let scored = highlighter
        .score(&extracted)
        .await
        .with_context(|| format!("failed to score {}", input.display()))?;

    if scored.outcome == PageOutcome::Scored {
        eprintln!(
            "✅ {} lines in {:.1}s: {} high, {} medium, {} low",
            scored.lines.len(),
            start.elapsed().as_secs_f64(),
            scored.count(Tier::High),
            scored.count(Tier::Medium),
            scored.count(Tier::Low)
        );
    }

    if let Some(path) = output {
        HighlightReport::save(&scored, format.into(), &path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("💾 Saved to: {}", path.display());
    } else {
        println!("{}", HighlightReport::generate(&scored, format.into())?);
    }

    Ok(())
}
