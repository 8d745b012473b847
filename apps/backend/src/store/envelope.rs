//! Store-owned wrapper around one session's snapshot.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::GameSnapshot;
use crate::store::event_log::{EventLog, EventLogEntry};
use crate::timers::ScheduledDeadline;

/// A snapshot paired with the version it hashes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedSnapshot {
    pub snapshot: GameSnapshot,
    pub version: String,
}

struct Current {
    snapshot: Arc<GameSnapshot>,
    version: String,
}

/// Live per-session bookkeeping.
///
/// The snapshot is swapped wholesale on every save, so readers see either the
/// old or the new state, never a mix. `command_lock` is the session-scoped
/// exclusive lock; tokio's mutex queues waiters in FIFO order.
pub struct SessionEnvelope {
    session_id: String,
    current: RwLock<Current>,
    command_lock: tokio::sync::Mutex<()>,
    processed_commands: Mutex<HashSet<String>>,
    event_log: Mutex<EventLog>,
    deadline: Mutex<Option<ScheduledDeadline>>,
}

impl SessionEnvelope {
    pub(crate) fn new(snapshot: Arc<GameSnapshot>, version: String) -> Self {
        Self {
            session_id: snapshot.session_id.clone(),
            current: RwLock::new(Current { snapshot, version }),
            command_lock: tokio::sync::Mutex::new(()),
            processed_commands: Mutex::new(HashSet::new()),
            event_log: Mutex::new(EventLog::default()),
            deadline: Mutex::new(None),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn version(&self) -> String {
        self.current.read().version.clone()
    }

    /// Deep copy of the stored snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        self.current.read().snapshot.as_ref().clone()
    }

    /// Snapshot and version read under one lock.
    pub fn versioned(&self) -> VersionedSnapshot {
        let current = self.current.read();
        VersionedSnapshot {
            snapshot: current.snapshot.as_ref().clone(),
            version: current.version.clone(),
        }
    }

    pub(crate) fn replace(&self, snapshot: Arc<GameSnapshot>, version: String) {
        *self.current.write() = Current { snapshot, version };
    }

    /// Acquire the session's exclusive command lock.
    pub async fn lock_commands(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.command_lock.lock().await
    }

    pub(crate) fn has_processed(&self, command_id: &str) -> bool {
        self.processed_commands.lock().contains(command_id)
    }

    pub(crate) fn mark_processed(&self, command_id: &str) {
        self.processed_commands.lock().insert(command_id.to_string());
    }

    pub(crate) fn event_log(&self) -> MutexGuard<'_, EventLog> {
        self.event_log.lock()
    }

    /// Copy of every log entry in arrival order.
    pub fn event_log_entries(&self) -> Vec<EventLogEntry> {
        self.event_log.lock().entries().to_vec()
    }

    /// Timer bookkeeping, owned by the timer supervisor.
    pub fn deadline_slot(&self) -> MutexGuard<'_, Option<ScheduledDeadline>> {
        self.deadline.lock()
    }

    /// Absolute due time of the scheduled timeout, if any.
    pub fn deadline_at(&self) -> Option<OffsetDateTime> {
        self.deadline.lock().as_ref().map(|d| d.due_at)
    }
}

impl std::fmt::Debug for SessionEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEnvelope")
            .field("session_id", &self.session_id)
            .field("version", &self.version())
            .field("deadline_at", &self.deadline_at())
            .finish_non_exhaustive()
    }
}
