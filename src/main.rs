use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use storefront::backends::Backends;
use storefront::catalog::memory_catalog::InMemoryCatalog;
use storefront::config::cache_kinds::CacheKind;
use storefront::config::server_config::ServerConfig;
use storefront::state::AppState;

#[derive(Debug, Clone, Parser)]
struct Args {
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    #[arg(long, default_value = "catalog.yml")]
    pub catalog: PathBuf,

    #[arg(long, value_enum, default_value = "memory")]
    pub cache: CacheKind,

    #[arg(long, default_value_t = 64)]
    pub subscriber_buffer: usize,

    /// Seconds between SSE keep-alive comments, 0 to disable.
    #[arg(long, default_value_t = 15)]
    pub keep_alive_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("storefront=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let config = ServerConfig::new(args.subscriber_buffer, args.keep_alive_secs)?
        .with_admin_token_from_env();
    if config.admin_token.is_some() {
        info!("admin routes enabled");
    }

    let catalog = InMemoryCatalog::load(&args.catalog)?;
    let cache = Backends::cache_store(args.cache).await?;

    let state = AppState::new(cache, Arc::new(catalog), config);
    let registry = Arc::clone(&state.registry);

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(addr = %args.bind, "storefront listening");

    axum::serve(listener, storefront::app(state))
        .with_graceful_shutdown(async move {
            if let Err(error) = tokio::signal::ctrl_c().await {
                error!(%error, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }

            info!("shutdown requested, closing product update streams");
            registry.shutdown();
        })
        .await
        .context("server error")?;

    Ok(())
}
