use axum::extract::ws::Utf8Bytes;
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::validation::SessionId;

/// Sending half of a session's outbound queue. The session's send task
/// drains the other half into its socket.
pub type Outbound = mpsc::Sender<Utf8Bytes>;

/// Outcome of one fan-out sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub pruned: usize,
}

/// Live sessions keyed by their id.
///
/// DashMap shards the map, so a session joining or leaving only contends with
/// a sweep touching the same shard.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<SessionId, Outbound>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the handle under a freshly generated id and returns the id.
    pub fn register(&self, outbound: Outbound) -> SessionId {
        let session_id = SessionId::generate();
        self.connections.insert(session_id.clone(), outbound);
        tracing::debug!(
            "Registered session {} ({} connected)",
            session_id,
            self.connections.len()
        );
        session_id
    }

    pub fn deregister(&self, session_id: &SessionId) -> bool {
        let removed = self.connections.remove(session_id).is_some();
        if removed {
            tracing::debug!(
                "Deregistered session {} ({} connected)",
                session_id,
                self.connections.len()
            );
        }
        removed
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.connections.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Hands `payload` to every session without waiting on any of them.
    ///
    /// A session whose queue is closed (its socket is gone) or full (it is not
    /// keeping up) is dropped from the registry once the sweep is over. One bad
    /// session never stops delivery to the rest.
    pub fn deliver(&self, payload: &Utf8Bytes) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let mut failed = Vec::new();

        // Removing while iterating would deadlock on the shard lock
        for entry in self.connections.iter() {
            match entry.value().try_send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("Session {} is not keeping up, dropping it", entry.key());
                    failed.push(entry.key().clone());
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!("Session {} is gone, dropping it", entry.key());
                    failed.push(entry.key().clone());
                }
            }
        }

        for session_id in failed {
            if self.connections.remove(&session_id).is_some() {
                report.pruned += 1;
            }
        }

        report
    }
}
