use serde::{Deserialize, Serialize};

use crate::error::{PlayerError, PlayerResult};

use super::types::SongId;

/// Inbound client command, one variant per wire `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Resume, or restart from `position` seconds when given
    Play {
        #[serde(default)]
        position: Option<f64>,
    },
    Pause,
    Seek {
        position: f64,
    },
    AddToQueue {
        song: SongId,
    },
    RemoveFromQueue {
        song: SongId,
    },
    PlaySong {
        song: SongId,
    },
    NextSong,
}

impl Command {
    /// Decodes a text frame. Unknown `type` tags and missing fields are rejected here.
    pub fn parse(text: &str) -> PlayerResult<Self> {
        serde_json::from_str(text).map_err(|e| PlayerError::MalformedCommand(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Play { .. } => "play",
            Command::Pause => "pause",
            Command::Seek { .. } => "seek",
            Command::AddToQueue { .. } => "add_to_queue",
            Command::RemoveFromQueue { .. } => "remove_from_queue",
            Command::PlaySong { .. } => "play_song",
            Command::NextSong => "next_song",
        }
    }
}
