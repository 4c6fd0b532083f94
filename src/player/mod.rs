mod broadcast;
mod engine;
mod handlers;
mod mutator;
mod session;
mod templates;
pub mod catalog;
pub mod clock;
pub mod commands;
pub mod download;
pub mod registry;
pub mod state;
pub mod types;
pub mod validation;

pub use broadcast::{broadcast, encode_snapshot};
pub use catalog::{CatalogProvider, DirectoryCatalog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::Command;
pub use download::{DownloadProvider, YtDlpDownloader};
pub use handlers::{DownloadResponse, parse_range_header};
pub use registry::{ConnectionRegistry, DeliveryReport};
pub use session::{handle_text, run_session};
pub use state::PlaybackState;
pub use types::{AppState, ServerMessage, SharedState, SongId, StateSnapshot};

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::PlayerResult;

use handlers::{download_song, index_page, not_found, stream_audio, sync_websocket};

/// Builds the shared state from the configuration: creates the audio and
/// static directories when missing, wires the directory catalog and yt-dlp
/// downloader, and runs the first catalog scan.
pub async fn init_player_state(config: &Config) -> PlayerResult<SharedState> {
    tokio::fs::create_dir_all(&config.audio_dir).await?;
    tokio::fs::create_dir_all(&config.static_dir).await?;

    let catalog = Arc::new(DirectoryCatalog::new(&config.audio_dir));
    let downloader = Arc::new(
        YtDlpDownloader::new(&config.yt_dlp, &config.audio_dir).with_cookies(config.cookies.clone()),
    );

    let state = AppState::new(config.audio_dir.clone(), catalog, downloader)
        .with_send_buffer(config.send_buffer)
        .into_shared();

    state.refresh_catalog().await?;

    Ok(state)
}

/// Creates the Axum router with every route of the listening room.
pub fn create_player_router(state: SharedState, static_dir: &std::path::Path) -> Router {
    Router::new()
        .route("/", get(index_page)) // Listening room page
        .route("/ws", get(sync_websocket)) // Sync WebSocket
        .route("/audio/{filename}", get(stream_audio)) // Audio streaming route
        .route("/download-youtube", post(download_song))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state) // Attach shared state to all routes
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Starts the server, binds to the configured address and runs Axum until Ctrl+C.
pub async fn initialize(config: Config) -> PlayerResult<()> {
    tracing::info!("Starting jam-sync server");

    let state = init_player_state(&config).await?;
    let router = create_player_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    let addr = listener.local_addr()?;

    match local_ip_address::local_ip() {
        Ok(ip) => tracing::info!(
            "✓ Listening on http://{} (LAN: http://{}:{})",
            addr,
            ip,
            addr.port()
        ),
        Err(e) => {
            tracing::info!("✓ Listening on http://{}", addr);
            tracing::debug!("Could not determine local IP address: {}", e);
        }
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Goodbye.");
    Ok(())
}
