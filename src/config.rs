//! Configuration module for the RAG pipeline.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `MINIRAG_` and use double
//! underscores to separate nested levels:
//! - `MINIRAG_RETRIEVAL__TOP_K=3` sets `retrieval.top_k`
//! - `MINIRAG_CHUNKING__OVERLAP_CHARS=20` sets `chunking.overlap_chars`
//! - `MINIRAG_GENERATION__MODEL=gpt-4o-mini` sets `generation.model`
//!
//! The API key itself is never part of the settings. It is read from the
//! environment variable named by `credentials.api_key_env`.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::documents::{ChunkingConfig, StoreConfig};
use crate::error::{RagError, RagResult};
use crate::providers::ApiKey;

const CONFIG_DIR: &str = ".minirag";
const CONFIG_FILE: &str = "settings.toml";
const ENV_PREFIX: &str = "MINIRAG_";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Settings {
    /// Sliding-window chunking
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Chunk storage
    #[serde(default)]
    pub store: StoreConfig,

    /// Similarity retrieval
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Embedding service
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Generation service
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Prompt template settings
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Where the API key comes from
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Log levels
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RetrievalConfig {
    /// Number of chunks passed to the generation service
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EmbeddingConfig {
    /// Model to use for embeddings
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Requested output dimensions (model default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,

    /// Request timeout; no timeout when unset
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Chat model used to answer
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature (service default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Completion token limit (service default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Request timeout; no timeout when unset
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PromptConfig {
    /// What the context is about, as named in the prompt
    #[serde(default = "default_subject")]
    pub subject: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CredentialsConfig {
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default level for all targets
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `pipeline = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_top_k() -> usize { 5 }
fn default_embedding_model() -> String { "text-embedding-3-small".to_string() }
fn default_generation_model() -> String { "gpt-3.5-turbo".to_string() }
fn default_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_timeout_secs() -> Option<u64> { Some(60) }
fn default_subject() -> String { "the provided document".to_string() }
fn default_api_key_env() -> String { "OPENAI_API_KEY".to_string() }
fn default_log_level() -> String { "warn".to_string() }

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            base_url: default_base_url(),
            dimensions: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_generation_model(),
            base_url: default_base_url(),
            temperature: None,
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            subject: default_subject(),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> RagResult<Self> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, with environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> RagResult<Self> {
        let settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nesting levels, single underscores stay in field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)?;

        settings.chunking.validate()?;
        Ok(settings)
    }

    /// Find the config file by looking for a `.minirag` directory
    /// from the current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> RagResult<ApiKey> {
        let var = &self.credentials.api_key_env;
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(ApiKey::new(value)),
            _ => Err(RagError::MissingApiKey { var: var.clone() }),
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Create a default settings file under `dir`
    pub fn init_config_file(
        dir: impl AsRef<Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = dir.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}
