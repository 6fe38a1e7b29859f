//! Model providers for summarization and sentence embeddings
//!
//! Each capability sits behind an async trait so the scoring pipeline can be
//! driven by local Python models, an external program, an OpenAI-compatible
//! HTTP endpoint or (for summaries) a purely extractive fallback.
//!
//! External programs speak JSON: one request object on stdin, one response
//! object on stdout.

pub mod embed;
pub mod summarize;

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::highlight::{HighlightError, Result};

pub use embed::{HttpEmbedder, ProcessEmbedder};
pub use summarize::{ExtractiveSummarizer, HttpSummarizer, ProcessSummarizer, SummaryParams};

/// Produces an abstractive summary of a document.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;

    fn name(&self) -> &str;
}

/// Maps sentences to dense vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input, in input order.
    async fn embed(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerBackend {
    /// `transformers` summarization pipeline via `python3`
    #[default]
    Python,
    /// External program speaking the JSON protocol
    Command,
    /// OpenAI-compatible chat completions endpoint
    Http,
    /// First sentences of the document
    Extractive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderBackend {
    /// `sentence-transformers` via `python3`
    #[default]
    Python,
    Command,
    /// OpenAI-compatible embeddings endpoint
    Http,
    /// No embedder; similarity policy decides what happens
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub backend: SummarizerBackend,
    pub model: String,
    pub python: String,
    pub command: Option<PathBuf>,
    pub args: Vec<String>,
    pub endpoint: String,
    /// Environment variable holding the bearer token, if any
    pub api_key_env: String,
    #[serde(flatten)]
    pub params: SummaryParams,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            backend: SummarizerBackend::default(),
            model: "facebook/bart-large-cnn".to_string(),
            python: "python3".to_string(),
            command: None,
            args: Vec::new(),
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            params: SummaryParams::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub backend: EmbedderBackend,
    pub model: String,
    pub python: String,
    pub command: Option<PathBuf>,
    pub args: Vec<String>,
    pub endpoint: String,
    pub api_key_env: String,
    pub batch_size: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            backend: EmbedderBackend::default(),
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            python: "python3".to_string(),
            command: None,
            args: Vec::new(),
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            batch_size: 64,
        }
    }
}

/// `[providers]` configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Upper bound for a single summarize or embed call
    pub timeout_secs: u64,
    pub summarizer: SummarizerConfig,
    pub embedder: EmbedderConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            summarizer: SummarizerConfig::default(),
            embedder: EmbedderConfig::default(),
        }
    }
}

impl ProviderConfig {
    /// Local-only providers: extractive summaries and no embedder.
    pub fn offline() -> Self {
        Self {
            summarizer: SummarizerConfig {
                backend: SummarizerBackend::Extractive,
                ..SummarizerConfig::default()
            },
            embedder: EmbedderConfig {
                backend: EmbedderBackend::None,
                ..EmbedderConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Build the configured summarizer.
pub fn build_summarizer(config: &SummarizerConfig) -> Result<Box<dyn Summarizer>> {
    let summarizer: Box<dyn Summarizer> = match config.backend {
        SummarizerBackend::Extractive => {
            Box::new(ExtractiveSummarizer::new(config.params.fallback_sentences))
        }
        SummarizerBackend::Python => Box::new(ProcessSummarizer::python(config)),
        SummarizerBackend::Command => {
            let program = required_command(config.command.as_deref(), "summarizer")?;
            Box::new(ProcessSummarizer::new(program, config.args.clone(), config))
        }
        SummarizerBackend::Http => Box::new(HttpSummarizer::new(config)?),
    };
    debug!("Summarizer: {}", summarizer.name());
    Ok(summarizer)
}

/// Build the configured embedder, if any.
pub fn build_embedder(config: &EmbedderConfig) -> Result<Option<Box<dyn Embedder>>> {
    let embedder: Box<dyn Embedder> = match config.backend {
        EmbedderBackend::None => return Ok(None),
        EmbedderBackend::Python => Box::new(ProcessEmbedder::python(config)),
        EmbedderBackend::Command => {
            let program = required_command(config.command.as_deref(), "embedder")?;
            Box::new(ProcessEmbedder::new(program, config.args.clone(), config))
        }
        EmbedderBackend::Http => Box::new(HttpEmbedder::new(config)?),
    };
    debug!("Embedder: {}", embedder.name());
    Ok(Some(embedder))
}

fn required_command(command: Option<&Path>, role: &str) -> Result<PathBuf> {
    let command = command.ok_or_else(|| {
        HighlightError::Config(format!("{role} backend 'command' needs a `command` path"))
    })?;
    resolve_program(command)
}

/// Resolve a program name through `PATH`; explicit paths must exist.
pub(crate) fn resolve_program(program: &Path) -> Result<PathBuf> {
    if program.components().count() > 1 {
        return if program.exists() {
            Ok(program.to_path_buf())
        } else {
            Err(HighlightError::MissingDependency(format!(
                "{} not found",
                program.display()
            )))
        };
    }
    which::which(program).map_err(|_| {
        HighlightError::MissingDependency(format!("{} not found in PATH", program.display()))
    })
}

/// Run a program with a JSON request on stdin and parse its JSON stdout.
///
/// `fail` wraps spawn, exit-status and decode failures in the caller's
/// error variant.
pub(crate) async fn run_json<I, O>(
    program: &Path,
    args: &[String],
    request: &I,
    fail: fn(String) -> HighlightError,
) -> Result<O>
where
    I: Serialize + Sync,
    O: DeserializeOwned,
{
    let input = serde_json::to_vec(request)?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| fail(format!("failed to spawn {}: {e}", program.display())))?;

    // stdin is fed while stdout drains, so a program that streams its
    // response as it reads cannot fill the pipe and stall
    let stdin = child.stdin.take();
    let write = async move {
        if let Some(mut stdin) = stdin {
            // a program that exits early is reported through its exit status
            match stdin.write_all(&input).await {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
                _ => {}
            }
        }
        Ok(())
    };

    let ((), output) = tokio::try_join!(write, child.wait_with_output())?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(fail(format!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            stderr.trim()
        )));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|e| fail(format!("invalid JSON from {}: {e}", program.display())))
}

/// Bearer token from the named environment variable, if set and non-empty.
pub(crate) fn api_key(env: &str) -> Option<String> {
    std::env::var(env).ok().filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_provider_section() {
        let toml_str = r#"
timeout_secs = 30

[summarizer]
backend = "http"
model = "gpt-4o-mini"
max_length = 120

[embedder]
backend = "none"
"#;
        let config: ProviderConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.summarizer.backend, SummarizerBackend::Http);
        assert_eq!(config.summarizer.params.max_length, 120);
        assert_eq!(config.summarizer.params.num_beams, 6);
        assert_eq!(config.embedder.backend, EmbedderBackend::None);
    }

    #[test]
    fn offline_has_no_embedder() {
        let config = ProviderConfig::offline();
        assert!(build_embedder(&config.embedder).unwrap().is_none());
        let summarizer = build_summarizer(&config.summarizer).unwrap();
        assert_eq!(summarizer.name(), "extractive");
    }

    #[test]
    fn command_backend_requires_a_path() {
        let config = SummarizerConfig {
            backend: SummarizerBackend::Command,
            ..SummarizerConfig::default()
        };
        assert!(matches!(
            build_summarizer(&config),
            Err(HighlightError::Config(_))
        ));
    }

    #[test]
    fn missing_program_is_reported() {
        let err = resolve_program(Path::new("/nonexistent/pagelight-embed")).unwrap_err();
        assert!(matches!(err, HighlightError::MissingDependency(_)));
        let err = resolve_program(Path::new("pagelight-no-such-binary-xyz")).unwrap_err();
        assert!(matches!(err, HighlightError::MissingDependency(_)));
    }

    #[tokio::test]
    async fn run_json_round_trips_through_cat() {
        let Ok(cat) = which::which("cat") else {
            return;
        };
        let out: serde_json::Value = run_json(
            &cat,
            &[],
            &serde_json::json!({"summary": "ok"}),
            HighlightError::Summary,
        )
        .await
        .unwrap();
        assert_eq!(out["summary"], "ok");
    }

    #[tokio::test]
    async fn run_json_streams_requests_larger_than_a_pipe() {
        let Ok(cat) = which::which("cat") else {
            return;
        };
        let text = "revolution ".repeat(200_000);
        let out: serde_json::Value = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            run_json(&cat, &[], &serde_json::json!({ "text": text }), HighlightError::Summary),
        )
        .await
        .expect("run_json stalled on a large request")
        .unwrap();
        assert_eq!(out["text"].as_str().unwrap().len(), text.len());
    }
}
