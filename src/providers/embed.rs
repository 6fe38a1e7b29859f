//! Sentence embedding backends

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use super::{api_key, run_json, Embedder, EmbedderConfig};
use crate::highlight::{HighlightError, Result};

const SENTENCE_TRANSFORMERS_SCRIPT: &str = r#"
import json
import sys
from sentence_transformers import SentenceTransformer

req = json.load(sys.stdin)
model = SentenceTransformer(req["model"])
vectors = model.encode(req["inputs"], batch_size=req["batch_size"])
print(json.dumps({"embeddings": [v.tolist() for v in vectors]}))
"#;

#[derive(Serialize)]
struct ProcessRequest<'a> {
    inputs: &'a [String],
    model: &'a str,
    batch_size: usize,
}

#[derive(Deserialize)]
struct ProcessResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedder backed by a subprocess speaking the JSON protocol.
///
/// Request: `{"inputs": [...], "model", "batch_size"}`.
/// Response: `{"embeddings": [[...], ...]}`.
pub struct ProcessEmbedder {
    program: PathBuf,
    args: Vec<String>,
    model: String,
    batch_size: usize,
    label: String,
}

impl ProcessEmbedder {
    pub fn new(program: PathBuf, args: Vec<String>, config: &EmbedderConfig) -> Self {
        let label = format!("command:{}", program.display());
        Self {
            program,
            args,
            model: config.model.clone(),
            batch_size: config.batch_size.max(1),
            label,
        }
    }

    /// Run the bundled `sentence-transformers` script.
    pub fn python(config: &EmbedderConfig) -> Self {
        let mut embedder = Self::new(
            PathBuf::from(&config.python),
            vec!["-c".to_string(), SENTENCE_TRANSFORMERS_SCRIPT.to_string()],
            config,
        );
        embedder.label = format!("sentence-transformers:{}", config.model);
        embedder
    }
}

#[async_trait]
impl Embedder for ProcessEmbedder {
    async fn embed(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }
        let request = ProcessRequest {
            inputs: sentences,
            model: &self.model,
            batch_size: self.batch_size,
        };
        let response: ProcessResponse =
            run_json(&self.program, &self.args, &request, HighlightError::Embedding).await?;
        check_count(response.embeddings, sentences.len())
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct HttpEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    batch_size: usize,
}

impl HttpEmbedder {
    pub fn new(config: &EmbedderConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(HighlightError::Config("embedder model is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: api_key(&config.api_key_env),
            batch_size: config.batch_size.max(1),
        })
    }

    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(HighlightError::Embedding(format!(
                "embeddings request failed ({status}): {body}"
            )));
        }

        let mut parsed: EmbeddingResponse = response.json().await?;
        parsed.data.sort_by_key(|entry| entry.index);
        check_count(
            parsed.data.into_iter().map(|entry| entry.embedding).collect(),
            inputs.len(),
        )
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>> {
        let batches = sentences
            .chunks(self.batch_size)
            .map(|batch| self.embed_batch(batch));
        let vectors = try_join_all(batches).await?;
        Ok(vectors.into_iter().flatten().collect())
    }

    fn name(&self) -> &str {
        &self.model
    }
}

fn check_count(vectors: Vec<Vec<f32>>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if vectors.len() == expected {
        Ok(vectors)
    } else {
        Err(HighlightError::Embedding(format!(
            "received {} embeddings for {expected} inputs",
            vectors.len()
        )))
    }
}
