mod chatbot;
mod config;
mod error;
mod locations;
mod posts;
mod speech;
mod web;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::locations::LocationDirectory;
use crate::posts::store::DocumentStore;
use crate::posts::PostRepository;
use crate::speech::GoogleTts;
use crate::web::templates::Templates;
use crate::web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,campus_portal=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Real data: {}", config.data.use_real_data);
    info!("  Locations: {}", config.locations.path.display());
    info!(
        "  Speech: {} (language {})",
        config.speech.base_url, config.speech.language
    );

    let posts = open_posts(&config).await?;
    info!(
        "  Posts: {}",
        if posts.uses_real_data() {
            "document store"
        } else {
            "built-in sample"
        }
    );

    let locations = LocationDirectory::new(config.locations.path.clone());
    locations
        .resolve("default")
        .await
        .context("Location table is not usable")?;

    let state = Arc::new(AppState {
        posts,
        locations,
        speech: Arc::new(GoogleTts::new(config.speech.clone())),
        templates: Templates::new().context("Failed to compile page templates")?,
    });

    let addr = &config.server.bind_address;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Campus portal listening on http://{}", addr);
    axum::serve(listener, web::router(state))
        .await
        .context("Server error")?;

    Ok(())
}

async fn open_posts(config: &Config) -> Result<PostRepository> {
    if !config.data.use_real_data {
        return Ok(PostRepository::sample());
    }

    let uri = config.database_uri()?;
    let store = DocumentStore::open(&uri, &config.data.collection)
        .context("Failed to open document store")?;

    if config.data.test_connection {
        store
            .check_connection()
            .await
            .context("Document store connection check failed")?;
    }

    Ok(PostRepository::from_store(store))
}
