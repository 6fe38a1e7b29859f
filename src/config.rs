//! Configuration loaded from `~/.config/pagelight/config.toml`.
//!
//! Every section is optional; missing keys take the built-in defaults.
//!
//! ```toml
//! [scoring]
//! semantic_weight = 0.5
//! on_embedding_failure = "degrade"
//!
//! [render]
//! dpi = 150
//!
//! [providers.summarizer]
//! backend = "http"
//! model = "gpt-4o-mini"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::highlight::{EmbeddingFailurePolicy, HighlightConfig, Highlighter};
use crate::providers::{build_embedder, build_summarizer, ProviderConfig};
use crate::render::HighlightStyle;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub highlight: HighlightConfig,
    pub render: HighlightStyle,
    pub providers: ProviderConfig,
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields defaults; an explicit path must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = config_path();
                if !default.exists() {
                    debug!("No config at {}, using defaults", default.display());
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid TOML in {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Switch to local-only providers: extractive summary, lexical + overlap similarity.
    #[must_use]
    pub fn offline(mut self) -> Self {
        self.providers = ProviderConfig::offline();
        self.highlight.similarity.on_embedding_failure = EmbeddingFailurePolicy::Degrade;
        self
    }

    /// Build a highlighter with the configured providers.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider cannot be constructed or an
    /// irrelevance pattern does not compile.
    pub fn highlighter(&self) -> Result<Highlighter> {
        let summarizer = build_summarizer(&self.providers.summarizer)
            .context("failed to set up summarizer")?;
        let embedder =
            build_embedder(&self.providers.embedder).context("failed to set up embedder")?;
        let highlighter = Highlighter::new(self.highlight.clone(), summarizer, embedder)?
            .with_timeout(Duration::from_secs(self.providers.timeout_secs))
            .with_fallback_sentences(self.providers.summarizer.params.fallback_sentences);
        Ok(highlighter)
    }
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pagelight")
        .join("config.toml")
}
