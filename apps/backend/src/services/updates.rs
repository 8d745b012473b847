//! Per-session change notifications.
//!
//! One broadcast channel per watched session. Publishing to a session nobody
//! watches is a cheap no-op.

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

const CHANNEL_CAPACITY: usize = 64;

/// Emitted after every committed snapshot change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub session_id: String,
    pub version: String,
}

#[derive(Default)]
pub struct SessionUpdateHub {
    channels: DashMap<String, broadcast::Sender<SessionUpdate>>,
}

impl SessionUpdateHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, session_id: &str) -> broadcast::Receiver<SessionUpdate> {
        self.channels
            .entry(session_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Returns the number of receivers reached.
    pub fn publish(&self, session_id: &str, version: &str) -> usize {
        let update = SessionUpdate {
            session_id: session_id.to_string(),
            version: version.to_string(),
        };
        let delivered = match self.channels.get(session_id) {
            Some(sender) => sender.send(update).unwrap_or(0),
            None => return 0,
        };
        if delivered == 0 {
            self.channels
                .remove_if(session_id, |_, sender| sender.receiver_count() == 0);
        }
        trace!(session_id, version, delivered, "session update published");
        delivered
    }
}
