//! The `examforge exam` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use examforge_core::model::ExamParams;

use super::{build_engine, load, Overrides};

pub async fn execute(
    params: ExamParams,
    json: bool,
    overrides: Overrides,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load(config_path.as_deref(), overrides)?;
    let engine = build_engine(&config)?;
    let total_time = params.total_time;

    let exam = engine
        .generate_questions(params)
        .await
        .context("failed to generate questions")?;
    println!("{}", exam.rendered);

    eprintln!("Write your answers below, then press Ctrl-D to submit.");
    let mut answers = String::new();
    tokio::io::stdin()
        .read_to_string(&mut answers)
        .await
        .context("failed to read answers from stdin")?;

    let outcome = engine
        .evaluate_answers(&exam.session, &answers, total_time)
        .await
        .context("failed to evaluate answers")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.rendered);
    }

    Ok(())
}
