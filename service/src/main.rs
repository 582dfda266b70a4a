#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tweetfeed_api::{config::Config, feed::select_source, http};

/// HTTP API serving normalized posts from the upstream API or a local generator.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config.yaml")]
    config: String,
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    // Load and validate configuration first (fail-fast)
    let config = Config::load_from(&args.config).map_err(|e| anyhow::anyhow!("{e}"))?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "tweetfeed-api starting up"
    );

    // Backend is chosen once for the lifetime of the process
    let source = select_source(&config.upstream).map_err(|e| anyhow::anyhow!("{e}"))?;
    match source.name() {
        "upstream" => tracing::info!(
            base_url = %config.upstream.base_url,
            timeout_secs = config.upstream.timeout_secs,
            "bearer token detected, serving posts from the upstream API"
        ),
        name => tracing::info!(backend = name, "no bearer token configured, serving generated posts"),
    }

    let app = http::app(source, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    if config.swagger.enabled {
        tracing::info!("API documentation at http://{}/docs", addr);
    }
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
