pub mod keywords;
pub mod render;
pub mod score;

use std::path::Path;

use anyhow::{bail, Context, Result};

use pagelight::highlight::ReportFormat;
use pagelight::{source, ExtractedPage, LineSource, PageDocument};

use crate::OutputFormat;

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Markdown => ReportFormat::Markdown,
        }
    }
}

/// Open `input` and extract the lines of 1-based `page`.
pub fn load_page(input: &Path, page: usize) -> Result<(Box<dyn PageDocument>, usize, ExtractedPage)> {
    if page == 0 {
        bail!("pages are numbered from 1");
    }
    let document =
        source::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let index = page - 1;
    let extracted = document
        .extract_lines(index)
        .with_context(|| format!("failed to extract page {page} of {}", input.display()))?;
    Ok((document, index, extracted))
}
