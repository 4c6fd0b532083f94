use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DEFAULT_SEND_BUFFER;

use super::catalog::CatalogProvider;
use super::clock::{Clock, SystemClock};
use super::download::DownloadProvider;
use super::registry::ConnectionRegistry;
use super::state::PlaybackState;

/// A song is identified by its file name inside the audio directory.
pub type SongId = String;

/// Full copy of the shared timeline as every client sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub current_song: Option<SongId>,
    pub is_playing: bool,
    /// Seconds into the current song at `timestamp`
    pub position: f64,
    pub queue: Vec<SongId>,
    pub available_songs: Vec<SongId>,
    /// Server clock, seconds since the UNIX epoch
    pub timestamp: f64,
}

/// Messages pushed to clients. Full snapshots are the only kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    StateUpdate(StateSnapshot),
}

pub struct AppState {
    /// Every read and write of the timeline goes through this one lock.
    pub playback: Mutex<PlaybackState>,

    /// Live sessions and their outbound queues.
    pub connections: ConnectionRegistry,

    pub clock: Arc<dyn Clock>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub downloader: Arc<dyn DownloadProvider>,

    /// Where `/audio/{filename}` reads from.
    pub audio_dir: PathBuf,

    /// Outbound messages buffered per session before it counts as too slow.
    pub send_buffer: usize,
}

/// Helper type for cleaner function signatures
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        audio_dir: PathBuf,
        catalog: Arc<dyn CatalogProvider>,
        downloader: Arc<dyn DownloadProvider>,
    ) -> Self {
        Self {
            playback: Mutex::new(PlaybackState::new()),
            connections: ConnectionRegistry::new(),
            clock: Arc::new(SystemClock),
            catalog,
            downloader,
            audio_dir,
            send_buffer: DEFAULT_SEND_BUFFER,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_send_buffer(mut self, send_buffer: usize) -> Self {
        self.send_buffer = send_buffer.max(1);
        self
    }

    pub fn with_playback(mut self, playback: PlaybackState) -> Self {
        self.playback = Mutex::new(playback);
        self
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(self)
    }
}
