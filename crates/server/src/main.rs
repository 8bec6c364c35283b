use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use gleaner_core::{Crawler, OutputDir};
use gleaner_server::{AppState, app, config::Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let env_filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let output = OutputDir::new(&config.output_dir);
    output
        .ensure()
        .with_context(|| format!("failed to create output directory: {}", output.path().display()))?;

    let state = Arc::new(AppState { crawler: Crawler::new(config.fetch_config(), output) });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(%addr, output_dir = %config.output_dir.display(), "server listening");

    axum::serve(listener, app(state)).await.context("server failed")?;

    Ok(())
}
