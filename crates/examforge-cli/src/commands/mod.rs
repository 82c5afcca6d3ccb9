pub mod exam;
pub mod init;
pub mod list_models;
pub mod serve;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use examforge_core::ExamEngine;
use examforge_providers::config::{load_config_from, ExamforgeConfig};

/// Provider and model chosen on the command line.
#[derive(Debug, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub model: Option<String>,
}

/// Load the config with any command-line overrides applied.
pub fn load(config_path: Option<&Path>, overrides: Overrides) -> Result<ExamforgeConfig> {
    let mut config = load_config_from(config_path)?;
    if let Some(provider) = overrides.provider {
        config.default_provider = provider;
    }
    if let Some(model) = overrides.model {
        config.default_model = model;
    }
    Ok(config)
}

/// Build the engine for the configured default provider.
pub fn build_engine(config: &ExamforgeConfig) -> Result<ExamEngine> {
    let provider = config.build_provider()?;
    tracing::info!(
        provider = provider.name(),
        model = %config.default_model,
        "using provider"
    );
    Ok(ExamEngine::new(Arc::from(provider), config.engine_config()))
}
