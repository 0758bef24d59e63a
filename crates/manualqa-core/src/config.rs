//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys use `__`, e.g. `APP_RETRIEVAL__TOP_K=6`). Every setting has a
//! default, so a missing `config.toml` yields a usable development setup.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::classifier::DEFAULT_KEYWORDS;
use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, env_name };
        config.settings()?.validate_for_env(&config.env_name)?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment, env_name: "custom".to_string() }
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub oracle: OracleSettings,
    pub server: ServerSettings,
}

impl Settings {
    pub fn validate_for_env(&self, env: &str) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be at least 1".to_string()));
        }
        if self.retrieval.expand_k < self.retrieval.top_k {
            return Err(Error::InvalidConfig(format!(
                "retrieval.expand_k ({}) must not be smaller than retrieval.top_k ({})",
                self.retrieval.expand_k, self.retrieval.top_k
            )));
        }
        if self.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be positive".to_string()));
        }
        match env {
            "prod" | "production" => {
                if self.embedding.provider == EmbeddingProvider::Hash {
                    return Err(Error::InvalidConfig("hash embeddings are not allowed in production".to_string()));
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

/// Locations of the build artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub pages_path: String,
    pub index_dir: String,
    pub index_table: String,
    pub meta_path: String,
    pub tables_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            pages_path: "data/pages.json".to_string(),
            index_dir: "data/index".to_string(),
            index_table: "pages".to_string(),
            meta_path: "data/meta.json".to_string(),
            tables_path: "data/tables.json".to_string(),
        }
    }
}

impl DataSettings {
    pub fn pages_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.pages_path)
    }

    pub fn index_dir(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.index_dir)
    }

    pub fn meta_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.meta_path)
    }

    pub fn tables_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.tables_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub expand_k: usize,
    /// Characters of each candidate shown to the reranking judge.
    pub rerank_char_budget: usize,
    pub keywords: Vec<String>,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 4,
            expand_k: 8,
            rerank_char_budget: 1800,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Gemini,
    Hash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Gemini,
            model: "text-embedding-004".to_string(),
            dim: 768,
        }
    }
}

impl EmbeddingSettings {
    /// `APP_USE_FAKE_EMBEDDINGS=1` forces the hash embedder regardless of config.
    pub fn effective_provider(&self) -> EmbeddingProvider {
        let use_fake = env::var("APP_USE_FAKE_EMBEDDINGS")
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if use_fake { EmbeddingProvider::Hash } else { self.provider }
    }
}

/// Connection to the hosted generation/embedding API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub judge_model: String,
    pub rerank_model: String,
    pub generation_model: String,
    pub timeout_secs: u64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            judge_model: "gemini-2.0-flash".to_string(),
            rerank_model: "gemini-1.5-flash".to_string(),
            generation_model: "gemini-2.0-flash".to_string(),
            timeout_secs: 60,
        }
    }
}

impl OracleSettings {
    /// Configured key, else `GOOGLE_API_KEY`.
    pub fn resolve_api_key(&self) -> anyhow::Result<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }
        env::var("GOOGLE_API_KEY")
            .map_err(|_| anyhow::anyhow!("no oracle API key: set oracle.api_key or GOOGLE_API_KEY"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8000 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
