//! The `examforge init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("examforge.toml").exists() {
        println!("examforge.toml already exists, skipping.");
    } else {
        std::fs::write("examforge.toml", SAMPLE_CONFIG)?;
        println!("Created examforge.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export MISTRAL_API_KEY (or edit examforge.toml for another provider)");
    println!("  2. Run: examforge serve");
    println!("  3. Or sit an exam in the terminal: examforge exam --subject Math --topic Algebra");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examforge configuration

default_provider = "mistral"
default_model = "mistral-large-latest"
default_temperature = 0.0
max_tokens = 4096
request_timeout_secs = 120

[server]
host = "127.0.0.1"
port = 7860

[providers.mistral]
type = "mistral"
api_key = "${MISTRAL_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"
"#;
