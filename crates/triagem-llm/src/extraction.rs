//! Free-text message → comma-separated symptom text.
//!
//! The matcher downstream is the only judge of what counts as a symptom, so the
//! extractor's output is passed on verbatim (trimmed) and never parsed here.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use triagem_common::config::LlmConfig;
use triagem_common::{Result, TriagemError};

use crate::backend::{LlmBackend, LlmRequest, Message};

const SYSTEM_PROMPT: &str = "\
Você é um assistente de triagem médica. Leia a mensagem do paciente e liste \
apenas os sintomas descritos, em português, separados por vírgula. \
Não inclua diagnósticos, explicações nem qualquer outro texto. \
Se nenhum sintoma for descrito, responda com uma linha vazia.";

const MAX_COMPLETION_TOKENS: u32 = 256;

#[async_trait]
pub trait SymptomExtractor: Send + Sync {
    /// Text that names the symptoms found in `free_text`. Any failure is fatal
    /// for the request.
    async fn extract_symptom_text(&self, free_text: &str) -> Result<String>;
}

// ── LLM-backed extractor ─────────────────────────────────────────────────────

pub struct LlmSymptomExtractor {
    backend: Arc<dyn LlmBackend>,
    temperature: f32,
}

impl LlmSymptomExtractor {
    pub fn new(backend: Arc<dyn LlmBackend>, temperature: f32) -> Self {
        Self { backend, temperature }
    }

    pub fn from_config(backend: Arc<dyn LlmBackend>, config: &LlmConfig) -> Self {
        Self::new(backend, config.temperature)
    }

    pub fn model_id(&self) -> &str {
        self.backend.model_id()
    }
}

#[async_trait]
impl SymptomExtractor for LlmSymptomExtractor {
    async fn extract_symptom_text(&self, free_text: &str) -> Result<String> {
        let req = LlmRequest {
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(free_text)],
            model: None,
            max_tokens: Some(MAX_COMPLETION_TOKENS),
            temperature: Some(self.temperature),
        };

        let resp = self.backend.complete(req).await?;
        debug!(
            "Extractor {} returned {} chars ({} prompt / {} completion tokens)",
            resp.model,
            resp.content.len(),
            resp.prompt_tokens,
            resp.completion_tokens
        );
        Ok(resp.content.trim().to_string())
    }
}

// ── Mocks ────────────────────────────────────────────────────────────────────

/// Returns a fixed answer regardless of the input.
pub struct StaticExtractor {
    answer: String,
}

impl StaticExtractor {
    pub fn new(answer: impl Into<String>) -> Self {
        Self { answer: answer.into() }
    }
}

#[async_trait]
impl SymptomExtractor for StaticExtractor {
    async fn extract_symptom_text(&self, _free_text: &str) -> Result<String> {
        Ok(self.answer.clone())
    }
}

/// Always fails, as an unreachable backend would.
pub struct FailingExtractor {
    message: String,
}

impl FailingExtractor {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[async_trait]
impl SymptomExtractor for FailingExtractor {
    async fn extract_symptom_text(&self, _free_text: &str) -> Result<String> {
        Err(TriagemError::Extraction(self.message.clone()))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
