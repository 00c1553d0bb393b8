//! Configuration loading for Triagem.
//! Reads triagem.toml from the current directory or the path in the TRIAGEM_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, TriagemError};

pub const CONFIG_ENV: &str = "TRIAGEM_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "triagem.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriagemConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

// ── Reference data ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_variations_path")]
    pub variations_path: PathBuf,
    #[serde(default = "default_weights_path")]
    pub weights_path: PathBuf,
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

fn default_variations_path() -> PathBuf { PathBuf::from("assets/datasets/sintomas_variacoes.csv") }
fn default_weights_path()    -> PathBuf { PathBuf::from("assets/datasets/Sintomas_pesos.csv") }
fn default_model_path()      -> PathBuf { PathBuf::from("assets/model/modelo_logistico.json") }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            variations_path: default_variations_path(),
            weights_path: default_weights_path(),
            model_path: default_model_path(),
        }
    }
}

// ── Prediction ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Number of specialties returned per analysis.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize { 3 }

impl Default for PredictionConfig {
    fn default() -> Self {
        Self { top_n: default_top_n() }
    }
}

// ── LLM extraction ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmBackendKind {
    Ollama,
    OpenaiCompatible,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_backend")]
    pub backend: LlmBackendKind,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Falls back to TRIAGEM_LLM_API_KEY when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_backend()  -> LlmBackendKind { LlmBackendKind::Ollama }
fn default_llm_base_url() -> String { "http://localhost:11434".to_string() }
fn default_llm_model()    -> String { "llama3.1".to_string() }
fn default_llm_timeout()  -> u64    { 60 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_llm_backend(),
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
            temperature: 0.0,
            timeout_secs: default_llm_timeout(),
        }
    }
}

// ── HTTP server ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16    { 8000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Analysis output ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Reported in place of the symptom list when nothing was recognized.
    #[serde(default = "default_none_sentinel")]
    pub none_sentinel: String,
}

fn default_none_sentinel() -> String { "Nenhum".to_string() }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { none_sentinel: default_none_sentinel() }
    }
}


impl TriagemConfig {
    /// Load configuration, then apply environment overrides.
    ///
    /// An explicit TRIAGEM_CONFIG that does not exist is an error; a missing
    /// default triagem.toml falls back to built-in defaults.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => {
                info!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TriagemError::Config(format!(
                "Config file not found: {}. Copy triagem.example.toml to triagem.toml and edit it.",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TriagemError::Config(e.to_string()))
    }

    /// API_HOST / API_PORT / TRIAGEM_LLM_API_KEY take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("API_PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = std::env::var("TRIAGEM_LLM_API_KEY").ok().filter(|k| !k.is_empty());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.prediction.top_n == 0 {
            return Err(TriagemError::Config("prediction.top_n must be at least 1".into()));
        }
        for (key, path) in [
            ("data.variations_path", &self.data.variations_path),
            ("data.weights_path", &self.data.weights_path),
            ("data.model_path", &self.data.model_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(TriagemError::Config(format!("{} must not be empty", key)));
            }
        }
        Ok(())
    }
}
