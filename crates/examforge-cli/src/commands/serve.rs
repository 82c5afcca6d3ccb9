//! The `examforge serve` command.

use std::path::PathBuf;

use anyhow::Result;

use examforge_web::AppState;

use super::{build_engine, load, Overrides};

pub async fn execute(
    host: Option<String>,
    port: Option<u16>,
    overrides: Overrides,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load(config_path.as_deref(), overrides)?;
    let engine = build_engine(&config)?;

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    examforge_web::serve(AppState::new(engine), &format!("{host}:{port}")).await
}
