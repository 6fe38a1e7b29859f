use std::path::Path;

use anyhow::{Context, Result};

use pagelight::highlight::PageOutcome;
use pagelight::render::{render, save_png};
use pagelight::{Config, Rasterizer};

pub async fn cmd_render(
    config: &Config,
    input: &Path,
    output: &Path,
    page: usize,
    dpi: Option<f32>,
) -> Result<()> {
    let (document, index, extracted) = super::load_page(input, page)?;
    eprintln!("🖍️  Highlighting: {} (page {page})", input.display());

    let highlighter = config.highlighter()?;
    let scored = highlighter
        .score(&extracted)
        .await
        .with_context(|| format!("failed to score {}", input.display()))?;

    let mut style = config.render.clone();
    if let Some(dpi) = dpi {
        style.dpi = dpi;
    }

    let mut image = document
        .rasterize(index, style.dpi)
        .with_context(|| format!("failed to rasterize page {page}"))?;
    let summary = render(&mut image, &scored.lines, &style);
    save_png(&image, output).with_context(|| format!("failed to write {}", output.display()))?;

    match scored.outcome {
        PageOutcome::Scored => {
            eprintln!(
                "   HIGH: {} lines ({} with proper nouns/keywords)",
                summary.high, summary.vocabulary_high
            );
            eprintln!(
                "   MEDIUM: {} lines ({} with proper nouns/keywords)",
                summary.medium, summary.vocabulary_medium
            );
            eprintln!(
                "   LOW: {} lines ({} irrelevant)",
                summary.low, summary.irrelevant_tinted
            );
        }
        PageOutcome::NoContent => eprintln!("⚠️  No text lines found, page left unhighlighted"),
        PageOutcome::InsufficientContent { chars } => {
            eprintln!("⚠️  Insufficient text ({chars} chars), page left unhighlighted");
        }
    }
    eprintln!("💾 Saved to: {}", output.display());

    Ok(())
}
