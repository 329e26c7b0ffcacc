use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use rag_qa::core::config::AppPaths;
use rag_qa::core::logging;
use rag_qa::state::AppState;

#[derive(Parser)]
#[command(name = "rag-ingest")]
#[command(about = "Chunk, embed and store an extracted text document")]
struct Args {
    /// UTF-8 text file holding the extracted document
    path: PathBuf,

    /// Chunk the text as-is, skipping whitespace normalization
    #[arg(long)]
    raw: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths.log_dir, "rag-ingest.log");

    match run(args, paths).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, paths: Arc<AppPaths>) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    let state = AppState::initialize(paths).await?;
    let ingestor = state.ingestor()?;
    let report = if args.raw {
        ingestor.ingest(&text).await?
    } else {
        ingestor.ingest_document(&text).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Ingested {}: {} chunk(s), {} stored",
            args.path.display(),
            report.chunk_count,
            report.stored
        );
        if !report.skipped.is_empty() {
            println!("Skipped chunks: {:?}", report.skipped);
        }
    }
    Ok(())
}
