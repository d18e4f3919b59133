//! Blackbox Relay - minimal chat relay API
//!
//! Forwards user text to the Blackbox.ai chat endpoint and returns the reply,
//! keeping each conversation's message history in process memory.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod routes;

#[cfg(test)]
mod testing;

use config::Config;
use core::{MemoryStore, RelayEngine};
use providers::BlackboxClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub relay_engine: Arc<RelayEngine>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blackbox_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let memory = Arc::new(MemoryStore::new(
        config.conversation_limit(),
        config.conversation_ttl(),
    ));

    let client = BlackboxClient::new(&config.upstream_url, config.timeout())?;
    tracing::info!("Relaying to {}", client.url());

    let relay_engine = Arc::new(RelayEngine::new(client, memory));

    let state = AppState {
        config,
        relay_engine,
    };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Server is running at http://{}", addr);
    tracing::info!(
        "API Endpoint: /api/blackbox?text=<your_text>&conversationId=<your_id>&model=<optional_model>"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
