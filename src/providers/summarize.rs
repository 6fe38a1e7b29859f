//! Summarization backends

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{api_key, run_json, Summarizer, SummarizerConfig};
use crate::highlight::{HighlightError, Result};
use crate::text::sentences;

/// Inline script for the `python` backend. Reads the request from stdin.
const TRANSFORMERS_SCRIPT: &str = r#"
import json
import sys
from transformers import pipeline

req = json.load(sys.stdin)
summarizer = pipeline("summarization", model=req["model"])
tokenizer = summarizer.tokenizer
ids = tokenizer.encode(req["text"], truncation=True, max_length=req["max_input_tokens"])
text = tokenizer.decode(ids, skip_special_tokens=True)
out = summarizer(
    text,
    max_length=req["max_length"],
    min_length=req["min_length"],
    num_beams=req["num_beams"],
    length_penalty=req["length_penalty"],
    no_repeat_ngram_size=req["no_repeat_ngram_size"],
    early_stopping=True,
    do_sample=False,
)
print(json.dumps({"summary": out[0]["summary_text"]}))
"#;

/// Generation parameters passed to abstractive backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryParams {
    /// Maximum summary length in tokens
    pub max_length: usize,
    /// Minimum summary length in tokens
    pub min_length: usize,
    pub num_beams: usize,
    pub length_penalty: f64,
    pub no_repeat_ngram_size: usize,
    /// Input is truncated to this many model tokens
    pub max_input_tokens: usize,
    /// Sentences kept by the extractive fallback
    pub fallback_sentences: usize,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            max_length: 150,
            min_length: 30,
            num_beams: 6,
            length_penalty: 1.2,
            no_repeat_ngram_size: 3,
            max_input_tokens: 1024,
            fallback_sentences: 3,
        }
    }
}

/// Leading sentences of the document.
#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer {
    sentences: usize,
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::new(3)
    }
}

impl ExtractiveSummarizer {
    pub fn new(sentences: usize) -> Self {
        Self {
            sentences: sentences.max(1),
        }
    }

    /// Join the first sentences with `". "` and end with a period.
    ///
    /// Terminal punctuation of each sentence is dropped first so the joins
    /// never double up. Text with no sentence content (only punctuation)
    /// is returned whitespace-collapsed as is; only blank input gives an
    /// empty summary.
    pub fn summarize_text(&self, text: &str) -> String {
        let lead: Vec<String> = sentences(text)
            .into_iter()
            .take(self.sentences)
            .map(|s| s.trim_end_matches(['.', '!', '?']).to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if lead.is_empty() {
            return text.split_whitespace().collect::<Vec<_>>().join(" ");
        }
        format!("{}.", lead.join(". "))
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        Ok(self.summarize_text(text))
    }

    fn name(&self) -> &str {
        "extractive"
    }
}

#[derive(Serialize)]
struct SummaryRequest<'a> {
    text: &'a str,
    model: &'a str,
    #[serde(flatten)]
    params: &'a SummaryParams,
}

#[derive(Deserialize)]
struct SummaryResponse {
    summary: String,
}

/// Summarizer backed by a subprocess speaking the JSON protocol.
///
/// Request: `{"text", "model", "max_length", "min_length", ...}`.
/// Response: `{"summary": "..."}`.
pub struct ProcessSummarizer {
    program: PathBuf,
    args: Vec<String>,
    model: String,
    params: SummaryParams,
    label: String,
}

impl ProcessSummarizer {
    pub fn new(program: PathBuf, args: Vec<String>, config: &SummarizerConfig) -> Self {
        let label = format!("command:{}", program.display());
        Self {
            program,
            args,
            model: config.model.clone(),
            params: config.params.clone(),
            label,
        }
    }

    /// Run the bundled `transformers` script with the configured interpreter.
    pub fn python(config: &SummarizerConfig) -> Self {
        let mut summarizer = Self::new(
            PathBuf::from(&config.python),
            vec!["-c".to_string(), TRANSFORMERS_SCRIPT.to_string()],
            config,
        );
        summarizer.label = format!("transformers:{}", config.model);
        summarizer
    }
}

#[async_trait]
impl Summarizer for ProcessSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        let request = SummaryRequest {
            text,
            model: &self.model,
            params: &self.params,
        };
        let response: SummaryResponse =
            run_json(&self.program, &self.args, &request, HighlightError::Summary).await?;
        Ok(response.summary.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Deserialize)]
struct ChatContent {
    content: Option<String>,
}

/// Summarizer backed by an OpenAI-compatible chat completions endpoint.
pub struct HttpSummarizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    instruction: String,
}

impl HttpSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(HighlightError::Config("summarizer model is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;
        let instruction = format!(
            "Summarize the user's text in roughly {} to {} words. \
             Reply with the summary only.",
            config.params.min_length, config.params.max_length
        );
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: api_key(&config.api_key_env),
            instruction,
        })
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.instruction,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.0,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HighlightError::Summary(format!(
                "summary request failed ({status}): {body}"
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| HighlightError::Summary("empty completion".to_string()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
