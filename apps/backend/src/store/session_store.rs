//! In-memory session store: one versioned snapshot per session.
//!
//! Uses DashMap so lookups for different sessions never contend; all
//! per-session serialization happens on the envelope's own lock.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::{GameSnapshot, SessionSummary};
use crate::errors::domain::{ConflictKind, DomainError};
use crate::store::envelope::SessionEnvelope;
use crate::store::event_log::{EventLogEntry, NewEventLogEntry};
use crate::store::version::compute_version;

#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<SessionEnvelope>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copy of `snapshot` and recompute its version.
    ///
    /// Creates the envelope on first save; later saves replace the snapshot
    /// and version in place, keeping the lock, log and idempotency ledger.
    pub fn save_snapshot(
        &self,
        snapshot: &GameSnapshot,
    ) -> Result<Arc<SessionEnvelope>, DomainError> {
        let version = compute_version(snapshot)?;
        let stored = Arc::new(snapshot.clone());

        let envelope = match self.sessions.entry(snapshot.session_id.clone()) {
            Entry::Occupied(entry) => {
                entry.get().replace(stored, version.clone());
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry
                .insert(Arc::new(SessionEnvelope::new(stored, version.clone())))
                .clone(),
        };
        debug!(session_id = %snapshot.session_id, %version, "snapshot saved");
        Ok(envelope)
    }

    /// Like [`save_snapshot`](Self::save_snapshot) but refuses to overwrite.
    pub fn insert_new(&self, snapshot: &GameSnapshot) -> Result<Arc<SessionEnvelope>, DomainError> {
        let version = compute_version(snapshot)?;
        match self.sessions.entry(snapshot.session_id.clone()) {
            Entry::Occupied(_) => Err(DomainError::conflict(
                ConflictKind::SessionExists,
                format!("Session {} already exists", snapshot.session_id),
            )),
            Entry::Vacant(entry) => {
                let envelope = Arc::new(SessionEnvelope::new(Arc::new(snapshot.clone()), version));
                Ok(entry.insert(envelope).clone())
            }
        }
    }

    /// Deep copy of the stored snapshot.
    pub fn get_snapshot(&self, session_id: &str) -> Option<GameSnapshot> {
        self.get_envelope(session_id).map(|e| e.snapshot())
    }

    /// The live envelope.
    pub fn get_envelope(&self, session_id: &str) -> Option<Arc<SessionEnvelope>> {
        self.sessions.get(session_id).map(|e| e.value().clone())
    }

    fn require_envelope(&self, session_id: &str) -> Result<Arc<SessionEnvelope>, DomainError> {
        self.get_envelope(session_id)
            .ok_or_else(|| DomainError::session_not_initialized(session_id))
    }

    pub fn has_processed_command(
        &self,
        session_id: &str,
        command_id: &str,
    ) -> Result<bool, DomainError> {
        Ok(self.require_envelope(session_id)?.has_processed(command_id))
    }

    pub fn mark_command_processed(
        &self,
        session_id: &str,
        command_id: &str,
    ) -> Result<(), DomainError> {
        self.require_envelope(session_id)?.mark_processed(command_id);
        Ok(())
    }

    pub fn append_event_log(
        &self,
        session_id: &str,
        entries: Vec<NewEventLogEntry>,
    ) -> Result<Vec<EventLogEntry>, DomainError> {
        Ok(self.require_envelope(session_id)?.event_log().append(entries))
    }

    pub fn list_event_log_after(
        &self,
        session_id: &str,
        after_id: Option<&str>,
    ) -> Result<Vec<EventLogEntry>, DomainError> {
        Ok(self.require_envelope(session_id)?.event_log().after(after_id))
    }

    /// Summaries of every session, ordered by id.
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        let envelopes: Vec<Arc<SessionEnvelope>> =
            self.sessions.iter().map(|e| e.value().clone()).collect();
        let mut summaries: Vec<SessionSummary> = envelopes
            .iter()
            .map(|envelope| {
                let current = envelope.versioned();
                current.snapshot.summary(&current.version)
            })
            .collect();
        summaries.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        summaries
    }
}
