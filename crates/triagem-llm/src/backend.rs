//! LLM backend trait and concrete implementations.
//!
//! Backends:
//!   OllamaBackend           - local Ollama (OpenAI-compatible endpoint)
//!   OpenAiCompatibleBackend - any OpenAI-compatible endpoint (LMStudio, vLLM,
//!                             Groq, OpenRouter, …)

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use triagem_common::config::{LlmBackendKind, LlmConfig};

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
}

impl From<LlmError> for triagem_common::TriagemError {
    fn from(e: LlmError) -> Self {
        triagem_common::TriagemError::Extraction(e.to_string())
    }
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,   // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;
    fn model_id(&self) -> &str;
    fn is_local(&self) -> bool;
}

// ── Helpers: OpenAI-style wire format ────────────────────────────────────────

fn parse_openai_response(json: &serde_json::Value, fallback_model: &str) -> LlmResponse {
    LlmResponse {
        content: json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        model: json["model"]
            .as_str()
            .unwrap_or(fallback_model)
            .to_string(),
        prompt_tokens:     json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    }
}

fn chat_body(req: &LlmRequest, default_model: &str) -> serde_json::Value {
    serde_json::json!({
        "model":       req.model.as_deref().unwrap_or(default_model),
        "messages":    req.messages,
        "max_tokens":  req.max_tokens.unwrap_or(512),
        "temperature": req.temperature.unwrap_or(0.0),
        "stream":      false,
    })
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;
    if status >= 400 {
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|body| {
                body["error"]["message"]
                    .as_str()
                    .or_else(|| body["error"].as_str())
                    .or_else(|| body["message"].as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| if text.is_empty() { "unknown API error".to_string() } else { text });
        return Err(LlmError::ApiError { status, message });
    }
    Ok(serde_json::from_str(&text)?)
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

// ── 1. Ollama (local) ─────────────────────────────────────────────────────────

pub struct OllamaBackend {
    pub base_url: String,
    pub model: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self { base_url: base_url.into(), model: model.into(), client: http_client(timeout)? })
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = chat_body(&req, &self.model);
        let resp = self.client.post(&url).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        Ok(parse_openai_response(&json, &self.model))
    }

    fn model_id(&self) -> &str { &self.model }
    fn is_local(&self) -> bool { true }
}

// ── 2. OpenAI-Compatible (LMStudio, vLLM, Groq, OpenRouter, …) ──────────────

pub struct OpenAiCompatibleBackend {
    pub base_url: String,
    pub model: String,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.map(SecretString::from),
            client: http_client(timeout)?,
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(k) => req.bearer_auth(k.expose_secret()),
            None    => req,
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = chat_body(&req, &self.model);
        let resp = self.auth(self.client.post(&url)).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        Ok(parse_openai_response(&json, &self.model))
    }

    fn model_id(&self) -> &str { &self.model }
    fn is_local(&self) -> bool { false }
}

// ── Factory ───────────────────────────────────────────────────────────────────

/// Build the backend selected in `[llm]`.
pub fn build_backend(config: &LlmConfig) -> Result<Box<dyn LlmBackend>, LlmError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    Ok(match config.backend {
        LlmBackendKind::Ollama => {
            Box::new(OllamaBackend::new(&config.base_url, &config.model, timeout)?)
        }
        LlmBackendKind::OpenaiCompatible => Box::new(OpenAiCompatibleBackend::new(
            &config.base_url,
            &config.model,
            config.api_key.clone(),
            timeout,
        )?),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
