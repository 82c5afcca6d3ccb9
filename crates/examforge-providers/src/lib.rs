//! examforge-providers: LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Mistral, OpenAI, Anthropic, and
//! Ollama, plus the config file that picks one of them.

pub mod anthropic;
pub mod config;
mod http;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{create_provider, load_config_from, ExamforgeConfig, ProviderConfig};
pub use examforge_core::error::ProviderError;
