mod analysis;
mod config;
mod errors;
mod ingest;
mod matching;
mod models;
mod requirements;
mod routes;
mod skills;
mod state;
mod text;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::skills::SkillLexicon;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Skill lexicon: built-in table plus optional synonym file
    let lexicon = SkillLexicon::load(config.synonyms_path.as_deref())?;
    info!("Skill lexicon loaded ({} aliases)", lexicon.alias_count());

    info!(
        "Upload limits: {} bytes per file, {} files per request",
        config.max_file_bytes, config.max_files_per_request
    );

    // Build app state (KeywordScorer is the default scorer backend)
    let state = AppState::new(config.clone(), lexicon);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the dashboard host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
