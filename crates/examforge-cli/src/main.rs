//! examforge CLI: serve the exam form, or sit an exam in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "examforge",
    version,
    about = "LLM exam question generator and answer grader"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the two-stage exam web form
    Serve {
        /// Address to bind (default from config: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default from config: 7860)
        #[arg(long)]
        port: Option<u16>,

        /// Override the configured provider
        #[arg(long)]
        provider: Option<String>,

        /// Override the configured model
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate an exam, answer it on stdin, and print the graded report
    Exam {
        /// Exam subject, e.g. "Mathematics"
        #[arg(long)]
        subject: String,

        /// Topic within the subject, e.g. "Linear equations"
        #[arg(long)]
        topic: String,

        /// Number of questions to generate
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
        num_questions: u32,

        /// Marks per question
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
        marks: u32,

        /// Time allowed, in minutes
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
        time: u32,

        /// Extra instructions for the question writer
        #[arg(long, default_value = "")]
        comment: String,

        /// Print the evaluation as JSON instead of the text report
        #[arg(long)]
        json: bool,

        /// Override the configured provider
        #[arg(long)]
        provider: Option<String>,

        /// Override the configured model
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter examforge.toml
    Init,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so reports on stdout stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("examforge=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            host,
            port,
            provider,
            model,
            config,
        } => {
            commands::serve::execute(
                host,
                port,
                commands::Overrides { provider, model },
                config,
            )
            .await
        }
        Commands::Exam {
            subject,
            topic,
            num_questions,
            marks,
            time,
            comment,
            json,
            provider,
            model,
            config,
        } => {
            let params = examforge_core::model::ExamParams {
                subject,
                topic,
                num_questions,
                marks_per_question: marks,
                total_time: time,
                comment,
            };
            commands::exam::execute(params, json, commands::Overrides { provider, model }, config)
                .await
        }
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
