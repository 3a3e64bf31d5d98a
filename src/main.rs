use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use abstract2vec::config::Config;
use abstract2vec::output::terminal;
use abstract2vec::pipeline;

/// abstract2vec: score patents against the abstracts that describe them.
///
/// Trains document vectors over a folder of patent and abstract files (plus
/// optional database text), then reports how similar each patent is to each
/// of its abstracts.
#[derive(Parser)]
#[command(name = "abstract2vec", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the corpus, train document vectors, and save them
    Train,

    /// Score patents against abstracts using the saved vectors
    Compare {
        /// How many of the best matches to print (default: 10)
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Train and compare in one pass
    Run {
        /// How many of the best matches to print (default: 10)
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Download the ONNX sentence embedding model (~90 MB)
    DownloadModel,

    /// Show corpus, database, vector store, and model status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load()?;
    init_logging(config.log_file.as_deref())?;

    match cli.command {
        Commands::Train => {
            println!("Training document vectors...");
            let outcome = run_blocking(config.clone(), |c| pipeline::train::run(&c)).await?;

            terminal::display_corpus_summary(&outcome.corpus);
            terminal::display_store_summary(&outcome.store);
            println!(
                "\n{} {}",
                "Vectors saved to".bold(),
                config.vectors_path.display()
            );
            println!("Next step: run `abstract2vec compare`");
        }

        Commands::Compare { top } => {
            println!("Comparing patents to abstracts...");
            let (store, records) =
                run_blocking(config.clone(), |c| pipeline::compare::run_from_disk(&c)).await?;

            terminal::display_store_summary(&store);
            terminal::display_top_matches(&records, top);
            println!(
                "{} {} ({} rows)",
                "Results written to".bold(),
                config.output_path.display(),
                records.len()
            );
        }

        Commands::Run { top } => {
            println!("Training document vectors and comparing...");
            let (outcome, records) = run_blocking(config.clone(), |c| pipeline::run(&c)).await?;

            terminal::display_corpus_summary(&outcome.corpus);
            terminal::display_store_summary(&outcome.store);
            terminal::display_top_matches(&records, top);
            println!(
                "{} {} ({} rows)",
                "Results written to".bold(),
                config.output_path.display(),
                records.len()
            );
        }

        Commands::DownloadModel => {
            println!("Downloading ONNX embedding model...");
            println!("  Destination: {}", config.model_dir.display());

            abstract2vec::embedding::download::download_model(&config.model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("Set ABSTRACT2VEC_EMBEDDER=onnx to train with it.");
        }

        Commands::Status => {
            abstract2vec::status::show(&config)?;
        }
    }

    Ok(())
}

/// Set up structured logging to stdout, plus an optional plain-text log file.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("abstract2vec=info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

/// Run a synchronous pipeline stage off the async runtime.
async fn run_blocking<T, F>(config: Config, stage: F) -> Result<T>
where
    F: FnOnce(Config) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || stage(config))
        .await
        .context("Pipeline task panicked")?
}
