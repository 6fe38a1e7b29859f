//! `pagelight` - Line-importance scoring and tiered highlighting
//!
//! # Features
//!
//! - **Document vocabulary**: proper nouns and TF-IDF topic keywords
//! - **Summary context**: abstractive summary with an extractive fallback
//! - **Similarity fusion**: sentence embeddings, lexical TF-IDF and token overlap
//! - **Adaptive tiers**: percentile/std thresholds plus rule enforcement
//! - **Rendering**: translucent high/medium overlays on the page raster
//!
//! # Example
//!
//! ```rust,no_run
//! use pagelight::{source, Config, HighlightReport, LineSource, ReportFormat};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?.offline();
//!     let highlighter = config.highlighter()?;
//!     let document = source::open(std::path::Path::new("page.json"))?;
//!     let page = document.extract_lines(0)?;
//!     let scored = highlighter.score(&page).await?;
//!     println!("{}", HighlightReport::generate(&scored, ReportFormat::Markdown)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod highlight;
pub mod providers;
pub mod render;
pub mod source;
pub mod text;

pub use config::Config;
pub use highlight::{
    HighlightConfig, HighlightError, HighlightReport, Highlighter, PageOutcome, ReportFormat,
    ScoredLine, ScoredPage, Tier,
};
pub use providers::{Embedder, Summarizer};
pub use render::{render, HighlightStyle, RenderSummary};
pub use source::{BBox, ExtractedPage, LineSource, PageDocument, Rasterizer, RawLine};

/// Version of pagelight
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
