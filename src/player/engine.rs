use crate::error::PlayerResult;

use super::broadcast::broadcast;
use super::commands::Command;
use super::registry::DeliveryReport;
use super::types::{AppState, SongId};

impl AppState {
    /// Applies a command and, when the state changed, broadcasts the result.
    ///
    /// The mutation and the enqueueing of the snapshot happen under the same lock,
    /// so every session sees snapshots in mutation order. Returns whether a
    /// broadcast went out.
    pub fn execute(&self, command: &Command) -> PlayerResult<bool> {
        let mut playback = self.playback.lock();
        let now = self.clock.now();

        if !playback.apply(command, now) {
            tracing::debug!("Ignored {} command, precondition not met", command.name());
            return Ok(false);
        }

        tracing::debug!(
            "Applied {}: song={:?}, playing={}, position={:.2}",
            command.name(),
            playback.current_song(),
            playback.is_playing(),
            playback.position(now)
        );

        broadcast(&playback, &self.connections, now)?;
        Ok(true)
    }

    /// Sends the current state to everyone, used on join and after a catalog change.
    pub fn broadcast_state(&self) -> PlayerResult<DeliveryReport> {
        let playback = self.playback.lock();
        broadcast(&playback, &self.connections, self.clock.now())
    }

    /// Rescans the catalog and swaps it in wholesale. The scan runs without the lock.
    pub async fn refresh_catalog(&self) -> PlayerResult<usize> {
        let songs = self.catalog.refresh().await?;
        let count = songs.len();

        self.playback.lock().replace_catalog(songs);
        tracing::info!("Catalog refreshed: {} song(s) available", count);

        Ok(count)
    }

    /// Fetches a new song, refreshes the catalog and tells every client about it.
    pub async fn download_song(&self, source_url: &str) -> PlayerResult<SongId> {
        tracing::info!("Downloading {}", source_url);
        let song = self.downloader.fetch(source_url).await?;
        tracing::info!("Downloaded {} from {}", song, source_url);

        self.refresh_catalog().await?;
        self.broadcast_state()?;

        Ok(song)
    }
}
