//! # latchkey-server
//!
//! HTTP server for the latchkey smart lock booking system.
//!
//! This binary provides:
//! - REST API for bookings, availability checks, and maintenance
//! - OpenAPI documentation at `/api/openapi.json`
//! - A periodic cleanup task for expired codes and bookings
//! - Structured logging to file and stdout
//!
//! ## Running
//!
//! ```bash
//! # Development
//! cargo run --package latchkey-server
//!
//! # Production
//! LATCHKEY_ENV=production ./latchkey-server
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::net::SocketAddr;
use std::sync::Arc;

use latchkey_core::{
    default_data_dir, AccessCodeProvider, BookingRepository, JsonFileRepository, LatchkeyConfig,
    LogSink, MemoryProvider, NotificationSink,
};
use latchkey_server::{api, cleanup, logging, state::AppState};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("LATCHKEY_ENV")
        .map(|env| env == "production")
        .unwrap_or(false);
    logging::init(is_production)?;

    info!("Starting latchkey-server");

    let config_path = std::env::var("LATCHKEY_CONFIG")
        .map_or_else(|_| LatchkeyConfig::default_path(), Into::into);
    let config = LatchkeyConfig::load_or_default(&config_path)?;
    info!(config_path = %config_path.display(), devices = config.devices.len(), "configuration loaded");

    let data_dir = config
        .storage
        .data_dir
        .clone()
        .unwrap_or_else(default_data_dir);
    let repository: Arc<dyn BookingRepository> = Arc::new(JsonFileRepository::open(&data_dir)?);
    info!(data_dir = %data_dir.display(), "repository opened");

    // The in-memory provider backs standalone deployments; a vendor-backed
    // AccessCodeProvider impl slots in here.
    let provider: Arc<dyn AccessCodeProvider> = Arc::new(MemoryProvider::new());
    let sink: Arc<dyn NotificationSink> = Arc::new(LogSink);

    let state = AppState::new(config, provider, repository, sink);

    cleanup::spawn(state.clone());

    let app = api::create_router(state);

    let port = std::env::var("LATCHKEY_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
