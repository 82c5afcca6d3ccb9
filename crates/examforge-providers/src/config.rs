//! Configuration and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examforge_core::engine::ExamEngineConfig;
use examforge_core::traits::LlmProvider;

use crate::anthropic::AnthropicProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single LLM provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Mistral {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Mistral {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Mistral")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Where the web form listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    7860
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Top-level examforge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamforgeConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used for both generation and grading.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used for both generation and grading.
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default)]
    pub default_temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Upper bound on one model call, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_provider() -> String {
    "mistral".to_string()
}
fn default_model() -> String {
    "mistral-large-latest".to_string()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_request_timeout() -> u64 {
    120
}

impl Default for ExamforgeConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: 0.0,
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
            system_prompt: None,
            server: ServerConfig::default(),
        }
    }
}

impl ExamforgeConfig {
    /// Engine settings derived from this config.
    pub fn engine_config(&self) -> ExamEngineConfig {
        ExamEngineConfig {
            model: self.default_model.clone(),
            temperature: self.default_temperature,
            max_tokens: self.max_tokens,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            system_prompt_override: self.system_prompt.clone(),
        }
    }

    /// Build the configured default provider.
    pub fn build_provider(&self) -> Result<Box<dyn LlmProvider>> {
        let provider_config = self.providers.get(&self.default_provider).with_context(|| {
            format!(
                "provider '{}' is not configured; add a [providers.{}] section or run `examforge init`",
                self.default_provider, self.default_provider
            )
        })?;
        create_provider(
            &self.default_provider,
            provider_config,
            self.request_timeout_secs,
        )
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    let opt = |o: &Option<String>| o.as_deref().map(resolve_env_vars);
    match config {
        ProviderConfig::Mistral { api_key, base_url } => ProviderConfig::Mistral {
            api_key: resolve_env_vars(api_key),
            base_url: opt(base_url),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: opt(base_url),
            org_id: opt(org_id),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: opt(base_url),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
    }
}

/// Put `key` into the named provider entry, creating it if missing.
fn override_api_key(config: &mut ExamforgeConfig, name: &str, key: String) {
    let entry = config
        .providers
        .entry(name.to_string())
        .or_insert_with(|| match name {
            "openai" => ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            },
            "anthropic" => ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            },
            _ => ProviderConfig::Mistral {
                api_key: String::new(),
                base_url: None,
            },
        });
    match entry {
        ProviderConfig::Mistral { api_key, .. }
        | ProviderConfig::OpenAI { api_key, .. }
        | ProviderConfig::Anthropic { api_key, .. } => *api_key = key,
        ProviderConfig::Ollama { .. } => {}
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `examforge.toml` in the current directory
/// 2. `~/.config/examforge/config.toml`
///
/// Environment variable overrides: `EXAMFORGE_MISTRAL_KEY`,
/// `EXAMFORGE_OPENAI_KEY`, `EXAMFORGE_ANTHROPIC_KEY`.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamforgeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examforge.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExamforgeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamforgeConfig::default(),
    };

    for (var, name) in [
        ("EXAMFORGE_MISTRAL_KEY", "mistral"),
        ("EXAMFORGE_OPENAI_KEY", "openai"),
        ("EXAMFORGE_ANTHROPIC_KEY", "anthropic"),
    ] {
        if let Ok(key) = std::env::var(var) {
            override_api_key(&mut config, name, key);
        }
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examforge"))
}

/// Create a provider instance from its configuration. `timeout_secs` bounds
/// each HTTP request.
pub fn create_provider(
    name: &str,
    config: &ProviderConfig,
    timeout_secs: u64,
) -> Result<Box<dyn LlmProvider>> {
    tracing::debug!(provider = name, timeout_secs, "creating provider");
    Ok(match config {
        ProviderConfig::Mistral { api_key, base_url } => {
            Box::new(OpenAiProvider::mistral(api_key, base_url.clone(), timeout_secs)?)
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Box::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
            timeout_secs,
        )?),
        ProviderConfig::Anthropic { api_key, base_url } => {
            Box::new(AnthropicProvider::new(api_key, base_url.clone(), timeout_secs)?)
        }
        ProviderConfig::Ollama { base_url } => Box::new(OllamaProvider::new(base_url, timeout_secs)?),
    })
}
