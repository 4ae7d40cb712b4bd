mod config;
mod errors;
mod extraction;
mod matching;
mod profile;
mod routes;
mod session;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::ExtractionClient;
use crate::profile::storage::{FileSlot, ProfileSlot, RedisSlot};
use crate::profile::SkillProfileStore;
use crate::routes::build_router;
use crate::session::registry::SessionRegistry;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Skill profile: Redis when configured, otherwise a JSON file on disk
    let slot: Arc<dyn ProfileSlot> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).context("invalid REDIS_URL")?;
            Arc::new(RedisSlot::new(client, config.profile_slot.clone()))
        }
        None => {
            tokio::fs::create_dir_all(&config.profile_dir)
                .await
                .with_context(|| format!("creating {}", config.profile_dir.display()))?;
            Arc::new(FileSlot::new(config.profile_dir.clone(), &config.profile_slot))
        }
    };
    info!("Skill profile stored at {}", slot.describe());
    let profile = SkillProfileStore::new(slot);

    // Extraction service client
    let extractor = ExtractionClient::new(
        &config.extraction_url,
        Duration::from_secs(config.extraction_timeout_secs),
    )?;
    info!(
        "Extraction client initialized ({}, timeout {}s)",
        extractor.base_url(),
        config.extraction_timeout_secs
    );

    let state = AppState {
        extractor: Arc::new(extractor),
        profile,
        sessions: SessionRegistry::new(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
