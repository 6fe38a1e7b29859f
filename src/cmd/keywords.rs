use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use pagelight::highlight::{Highlighter, PageOutcome};
use pagelight::providers::ExtractiveSummarizer;
use pagelight::Config;

use crate::OutputFormat;

#[derive(Serialize)]
struct Vocabulary<'a> {
    proper_nouns: Vec<&'a str>,
    topic_keywords: &'a [String],
}

pub fn cmd_keywords(config: &Config, input: &Path, page: usize, format: OutputFormat) -> Result<()> {
    let (_, _, extracted) = super::load_page(input, page)?;
    // Vocabulary needs no model providers.
    let highlighter = Highlighter::new(
        config.highlight.clone(),
        Box::new(ExtractiveSummarizer::default()),
        None,
    )?;

    let context = match highlighter.vocabulary(&extracted) {
        Ok(context) => context,
        Err(PageOutcome::InsufficientContent { chars }) => {
            eprintln!("⚠️  Insufficient text content for analysis ({chars} characters)");
            return Ok(());
        }
        Err(_) => {
            eprintln!("⚠️  No text lines found on page {page}");
            return Ok(());
        }
    };

    let vocabulary = Vocabulary {
        proper_nouns: context.proper_nouns.iter().map(String::as_str).collect(),
        topic_keywords: &context.topic_keywords,
    };

    let out = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&vocabulary)?,
        OutputFormat::Markdown => {
            let mut md = String::new();
            writeln!(md, "## Proper nouns ({})\n", vocabulary.proper_nouns.len())?;
            for noun in &vocabulary.proper_nouns {
                writeln!(md, "- {noun}")?;
            }
            writeln!(md, "\n## Topic keywords ({})\n", vocabulary.topic_keywords.len())?;
            for keyword in vocabulary.topic_keywords {
                writeln!(md, "- {keyword}")?;
            }
            md
        }
    };
    println!("{out}");

    Ok(())
}
