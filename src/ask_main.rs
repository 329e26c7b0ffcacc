use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use rag_qa::core::config::AppPaths;
use rag_qa::core::logging;
use rag_qa::state::AppState;

#[derive(Parser)]
#[command(name = "rag-ask")]
#[command(about = "Answer a question from the ingested document")]
struct Args {
    /// Question to answer
    query: String,

    /// Name recorded in the conversation history
    #[arg(long, default_value = "cli")]
    user: String,

    /// Print the full outcome as JSON instead of the bare answer
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths.log_dir, "rag-ask.log");

    match run(args, paths).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, paths: Arc<AppPaths>) -> anyhow::Result<()> {
    if args.query.trim().is_empty() {
        anyhow::bail!("query must not be empty");
    }

    let state = AppState::initialize(paths).await?;
    let outcome = state.pipeline.ask(&args.user, args.query.trim()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.answer);
    }

    if let Some(failure) = outcome.error {
        anyhow::bail!("{} failed: {}", failure.kind, failure.message);
    }
    Ok(())
}
