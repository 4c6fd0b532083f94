use axum::extract::ws::Utf8Bytes;

use crate::error::PlayerResult;

use super::registry::{ConnectionRegistry, DeliveryReport};
use super::state::PlaybackState;
use super::types::ServerMessage;

/// Serializes the snapshot at `now` once so every session gets the same bytes.
pub fn encode_snapshot(state: &PlaybackState, now: f64) -> PlayerResult<Utf8Bytes> {
    let message = ServerMessage::StateUpdate(state.snapshot(now));
    let json = serde_json::to_string(&message)?;
    Ok(json.into())
}

/// Pushes the full state to every registered session, pruning the ones that
/// could not take it.
pub fn broadcast(
    state: &PlaybackState,
    registry: &ConnectionRegistry,
    now: f64,
) -> PlayerResult<DeliveryReport> {
    if registry.is_empty() {
        return Ok(DeliveryReport::default());
    }

    let payload = encode_snapshot(state, now)?;
    let report = registry.deliver(&payload);

    tracing::trace!(
        "Snapshot sent to {} session(s), pruned {}",
        report.delivered,
        report.pruned
    );

    Ok(report)
}
