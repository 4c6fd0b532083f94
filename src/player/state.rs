use std::collections::BTreeSet;

use super::types::{SongId, StateSnapshot};

/// The one shared playback timeline.
///
/// Player configurations are `(current_song, is_playing)`:
/// `(None, false)` idle, `(Some, true)` playing, `(Some, false)` paused.
/// Only [`PlaybackState::apply`] moves between them.
#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    pub(super) current_song: Option<SongId>,
    pub(super) is_playing: bool,
    /// Clock reading at which position zero of the current song would have occurred.
    pub(super) start_time: f64,
    /// Total paused time subtracted from elapsed-since-start.
    pub(super) pause_accumulator: f64,
    /// Clock reading at which the current pause began.
    pub(super) paused_at: Option<f64>,
    pub(super) queue: Vec<SongId>,
    pub(super) available_songs: BTreeSet<SongId>,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog<I, S>(songs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SongId>,
    {
        Self {
            available_songs: songs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn current_song(&self) -> Option<&str> {
        self.current_song.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn queue(&self) -> &[SongId] {
        &self.queue
    }

    pub fn available_songs(&self) -> &BTreeSet<SongId> {
        &self.available_songs
    }

    /// Elapsed playback offset in seconds, derived from the clock on every call.
    /// While paused the offset stays frozen at the moment the pause began.
    pub fn position(&self, now: f64) -> f64 {
        if self.current_song.is_none() {
            return 0.0;
        }

        let reference = match (self.is_playing, self.paused_at) {
            (false, Some(paused_at)) => paused_at,
            _ => now,
        };

        (reference - self.start_time - self.pause_accumulator).max(0.0)
    }

    /// Swaps in a freshly scanned catalog. The queue is left alone even if
    /// some of its songs are no longer on disk.
    pub fn replace_catalog(&mut self, songs: BTreeSet<SongId>) {
        self.available_songs = songs;
    }

    pub fn snapshot(&self, now: f64) -> StateSnapshot {
        StateSnapshot {
            current_song: self.current_song.clone(),
            is_playing: self.is_playing,
            position: self.position(now),
            queue: self.queue.clone(),
            available_songs: self.available_songs.iter().cloned().collect(),
            timestamp: now,
        }
    }
}
