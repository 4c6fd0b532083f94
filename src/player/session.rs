use std::fmt::Display;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;

use super::commands::Command;
use super::types::{AppState, SharedState};
use super::validation::SessionId;

/// Manages the full lifecycle of a sync WebSocket connection.
pub async fn handle_connection(socket: WebSocket, state: SharedState) {
    let (sender, receiver) = socket.split();
    run_session(state, sender, receiver).await;
}

/// Drives one session over any split transport.
///
/// Registers the session, broadcasts the current state so the newcomer is
/// synced through the regular path, then runs a send task (outbound queue to
/// socket) against a receive task (socket to state machine). Whichever ends
/// first aborts the other, and the session is deregistered.
pub async fn run_session<S, R, E>(state: SharedState, mut sender: S, mut receiver: R)
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Display + Send,
    R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Display + Send,
{
    let (out_tx, mut out_rx) = mpsc::channel::<Utf8Bytes>(state.send_buffer);
    let session_id = state.connections.register(out_tx);

    tracing::info!(
        "Client connected: {} ({} connected)",
        session_id,
        state.connections.len()
    );

    if let Err(e) = state.broadcast_state() {
        tracing::error!("Failed to broadcast state for new session: {}", e);
    }

    // Send task
    let send_session_id = session_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = out_rx.recv().await {
            if let Err(e) = sender.send(Message::Text(payload)).await {
                tracing::debug!("Failed to send to {}: {}", send_session_id, e);
                break;
            }
        }
        tracing::debug!("Send task ended for {}", send_session_id);
    });

    // Receive task
    let state_clone = state.clone();
    let receive_session_id = session_id.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg_result) = receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    handle_text(&state_clone, &receive_session_id, text.as_str());
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!("Client {} closed connection", receive_session_id);
                    break;
                }
                Err(e) => {
                    tracing::debug!("WebSocket error on {}: {}", receive_session_id, e);
                    break;
                }
                _ => {}
            }
        }
        tracing::debug!("Receive task ended for {}", receive_session_id);
    });

    // Wait for either task to complete, then abort the other too
    tokio::select! {
        _ = &mut send_task => {
            receive_task.abort();
        }
        _ = &mut receive_task => {
            send_task.abort();
        }
    }

    state.connections.deregister(&session_id);

    tracing::info!(
        "Client disconnected: {} ({} connected)",
        session_id,
        state.connections.len()
    );
}

/// Decodes one text frame and runs it through the state machine.
/// Malformed frames are logged and dropped; the session carries on.
/// Returns whether a broadcast went out.
pub fn handle_text(state: &AppState, session_id: &SessionId, text: &str) -> bool {
    tracing::trace!("Received from {}: {}", session_id, text);

    let command = match Command::parse(text) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!("Discarding message from {}: {}", session_id, e);
            return false;
        }
    };

    match state.execute(&command) {
        Ok(broadcasted) => broadcasted,
        Err(e) => {
            tracing::error!("Failed to handle {} from {}: {}", command.name(), session_id, e);
            false
        }
    }
}
