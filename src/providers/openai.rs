//! Blocking clients for OpenAI-compatible embedding and chat endpoints.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{ApiKey, EmbeddingService, GenerationRequest, GenerationService, ProviderError};
use crate::config::{EmbeddingConfig, GenerationConfig};
use crate::documents::Embedding;

const EMBEDDINGS_SERVICE: &str = "OpenAI embeddings";
const CHAT_SERVICE: &str = "OpenAI chat completions";

fn build_client(api_key: &ApiKey, timeout_secs: Option<u64>) -> Result<Client, ProviderError> {
    if api_key.is_blank() {
        return Err(ProviderError::InvalidApiKey);
    }
    let mut headers = HeaderMap::new();
    let auth = format!("Bearer {}", api_key.expose());
    let mut auth = HeaderValue::from_str(&auth).map_err(|_| ProviderError::InvalidApiKey)?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(timeout_secs.map(Duration::from_secs))
        .default_headers(headers)
        .build()
        .map_err(ProviderError::Client)
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

/// Turn a non-success response into a status error carrying the body.
fn check_status(resp: Response, service: &'static str) -> Result<Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .text()
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    Err(ProviderError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}

/// Embeddings client for `POST {base_url}/embeddings`.
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
}

impl OpenAiEmbedder {
    pub fn new(api_key: &ApiKey, config: &EmbeddingConfig) -> Result<Self, ProviderError> {
        let client = build_client(api_key, config.timeout_secs)?;
        Ok(Self {
            client,
            endpoint: endpoint(&config.base_url, "embeddings"),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }
}

impl EmbeddingService for OpenAiEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    fn embed(&self, inputs: &[&str]) -> Result<Vec<Embedding>, ProviderError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: self.dimensions,
        };
        tracing::debug!(
            target: "openai",
            "embedding {} inputs with {}",
            inputs.len(),
            self.model
        );
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|source| ProviderError::Transport {
                endpoint: self.endpoint.clone(),
                source,
            })?;
        let parsed: EmbeddingResponse = check_status(resp, EMBEDDINGS_SERVICE)?
            .json()
            .map_err(|source| ProviderError::Decode {
                service: EMBEDDINGS_SERVICE,
                source,
            })?;
        parsed.into_vectors(inputs.len())
    }
}

/// Chat client for `POST {base_url}/chat/completions`.
pub struct OpenAiChat {
    client: Client,
    endpoint: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiChat {
    pub fn new(api_key: &ApiKey, config: &GenerationConfig) -> Result<Self, ProviderError> {
        let client = build_client(api_key, config.timeout_secs)?;
        Ok(Self {
            client,
            endpoint: endpoint(&config.base_url, "chat/completions"),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

impl GenerationService for OpenAiChat {
    fn model(&self) -> &str {
        &self.model
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        tracing::debug!(
            target: "openai",
            "requesting completion from {} ({} prompt chars)",
            self.model,
            request.prompt.chars().count()
        );
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|source| ProviderError::Transport {
                endpoint: self.endpoint.clone(),
                source,
            })?;
        let parsed: ChatResponse = check_status(resp, CHAT_SERVICE)?
            .json()
            .map_err(|source| ProviderError::Decode {
                service: CHAT_SERVICE,
                source,
            })?;
        parsed.into_answer()
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
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

impl EmbeddingResponse {
    fn into_vectors(mut self, expected: usize) -> Result<Vec<Embedding>, ProviderError> {
        if self.data.len() != expected {
            return Err(ProviderError::MalformedResponse(format!(
                "{} embeddings returned for {expected} inputs",
                self.data.len()
            )));
        }
        self.data.sort_by_key(|entry| entry.index);
        Ok(self.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_answer(self) -> Result<String, ProviderError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ProviderError::MalformedResponse("completion has no message content".to_string())
            })
    }
}
