use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use rag_qa::core::config::AppPaths;
use rag_qa::core::logging;
use rag_qa::server;
use rag_qa::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths.log_dir, "rag-qa.log");

    let state = AppState::initialize(paths).await?;

    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    match state.store.count().await {
        Ok(0) => tracing::warn!("Vector store is empty; run rag-ingest before asking questions"),
        Ok(n) => tracing::info!("Vector store holds {} segment(s)", n),
        Err(err) => tracing::warn!("Could not count stored segments: {}", err),
    }
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
