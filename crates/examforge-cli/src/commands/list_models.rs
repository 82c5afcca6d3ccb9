//! The `examforge list-models` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examforge_core::traits::ModelInfo;
use examforge_providers::ollama::OllamaProvider;
use examforge_providers::{create_provider, ProviderConfig};

pub async fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = examforge_providers::config::load_config_from(config_path.as_deref())?;

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    let mut table = Table::new();
    table.set_header(vec!["Provider", "Model", "Name", "Context", "Structured output"]);
    let mut rows = 0;

    for name in names {
        if provider_filter.as_ref().is_some_and(|filter| filter != name) {
            continue;
        }

        let models = match &config.providers[name] {
            ProviderConfig::Ollama { base_url } => {
                let ollama = OllamaProvider::new(base_url, config.request_timeout_secs)?;
                match ollama.list_models_async().await {
                    Ok(models) => models,
                    Err(e) => {
                        tracing::warn!(provider = %name, "could not list models: {e:#}");
                        continue;
                    }
                }
            }
            provider_config => create_provider(name, provider_config, config.request_timeout_secs)?
                .available_models(),
        };

        for model in &models {
            table.add_row(row(name, model));
            rows += 1;
        }
    }

    if rows == 0 {
        println!("No providers configured. Run `examforge init` to create a config file.");
    } else {
        println!("{table}");
    }

    Ok(())
}

fn row(provider: &str, model: &ModelInfo) -> Vec<Cell> {
    let context = if model.max_context == 0 {
        "-".to_string()
    } else {
        format!("{}K", model.max_context / 1000)
    };
    let structured = if model.native_structured_output {
        "native"
    } else {
        "prompted"
    };
    vec![
        Cell::new(provider),
        Cell::new(&model.id),
        Cell::new(&model.name),
        Cell::new(context),
        Cell::new(structured),
    ]
}
