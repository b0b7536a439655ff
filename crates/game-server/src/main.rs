//! Chess game server
//!
//! Usage: `game-server [config.toml]`. The config path may also be given in
//! `CHESS_SERVER_CONFIG`; without either, defaults apply.

use std::sync::Arc;

use anyhow::Context;
use game_server::{ws, MemoryStore, ServerConfig, ServerContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "CHESS_SERVER_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).or_else(|| std::env::var(CONFIG_ENV).ok());
    let config = match &config_path {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = Arc::new(MemoryStore::new());
    config.seed(&store).context("failed to seed fixtures")?;
    info!(
        users = config.users.len(),
        games = store.game_count()?,
        config = config_path.as_deref().unwrap_or("<defaults>"),
        "store ready"
    );

    let ctx = Arc::new(ServerContext::with_memory_store(store));
    let app = ws::router(ctx, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, path = %config.ws_path, "game server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
