use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use docsort::analysis::analyzer::TextAnalyzer;
use docsort::analysis::download;
use docsort::analysis::embeddings::{HashingEmbedder, SentenceEmbedder};
use docsort::analysis::extractor::PhraseExtractor;
use docsort::analysis::lexicon::Lexicon;
use docsort::analysis::traits::Embedder;
use docsort::config::{Config, EmbedderBackend};
use docsort::index::flat::VectorIndex;
use docsort::index::shared::SharedIndex;
use docsort::output::terminal;
use docsort::pipeline::batch::{self, BatchOptions, Services};

/// docsort: classify documents by keyword signals and find similar ones.
#[derive(Parser)]
#[command(name = "docsort", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify documents, add them to the similarity index, and report
    Classify {
        /// Text documents to process
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Similar documents to report per file (default: DOCSORT_NEIGHBORS or 3)
        #[arg(long)]
        neighbors: Option<usize>,

        /// Documents to analyze in parallel (default: DOCSORT_CONCURRENCY or 4)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Leave files where they are instead of moving them into category folders
        #[arg(long)]
        no_move: bool,
    },

    /// Download the sentence embedding model (~90 MB)
    DownloadModel,

    /// Show the size and dimension of the similarity index
    IndexStats,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("docsort=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            files,
            neighbors,
            concurrency,
            no_move,
        } => {
            let config = Config::load()?;
            config.require_embedder()?;

            let services = build_services(&config)?;
            let index = SharedIndex::open(&config.index_path, Some(services.embedder.dimension()));

            let options = BatchOptions {
                neighbors: neighbors.unwrap_or(config.neighbors),
                concurrency: concurrency.unwrap_or(config.concurrency),
                relocate_to: (!no_move).then(|| config.output_dir.clone()),
            };

            println!("Processing {} files...", files.len());

            let report = batch::run_batch(&files, &services, &index, &options)
                .await
                .with_context(|| {
                    format!("Failed to update index at {}", config.index_path.display())
                })?;

            terminal::display_summary(&report);
            terminal::display_results(&report);

            println!("\n{}", "Document processing completed.".bold());
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading ONNX embedding model...");
            println!("  Destination: {}", model_dir.display());

            download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `docsort classify <files>`.");
        }

        Commands::IndexStats => {
            let config = Config::load()?;
            let path = &config.index_path;

            if !path.exists() {
                println!("Index: not created yet ({})", path.display());
                println!("\nRun `docsort classify <files>` to build it.");
                return Ok(());
            }

            let index = VectorIndex::load(path)
                .with_context(|| format!("Failed to read index at {}", path.display()))?;
            println!("Index: {}", path.display());
            println!("  Vectors: {}", index.len());
            match index.dimension() {
                Some(dim) => println!("  Dimension: {dim}"),
                None => println!("  Dimension: not fixed yet"),
            }
        }
    }

    Ok(())
}

/// Construct the analyzer, extractor, and embedder once for the whole run.
fn build_services(config: &Config) -> Result<Services> {
    let lexicon = match &config.lexicon_path {
        Some(path) => {
            info!(path = %path.display(), "Loading lexicon");
            Lexicon::load(path)?
        }
        None => Lexicon::default(),
    };

    let embedder: Arc<dyn Embedder> = match config.embedder_backend {
        EmbedderBackend::Onnx => {
            let dir = download::embedding_model_dir(&config.model_dir);
            Arc::new(SentenceEmbedder::load(&dir)?)
        }
        EmbedderBackend::Hashing => Arc::new(HashingEmbedder::default()),
    };

    Ok(Services {
        analyzer: Arc::new(TextAnalyzer::new(lexicon)),
        extractor: Arc::new(PhraseExtractor::new()),
        embedder,
    })
}
