//! Shared listening room: one playback timeline kept in sync across every
//! connected WebSocket client.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod player;
