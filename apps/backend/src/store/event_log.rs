//! Append-only, ordered record of every state-changing action.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A stored, immutable log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLogEntry {
    /// `turn-{turn}-log-{sequence}`.
    pub id: String,
    pub turn: u32,
    /// Player id or `"system"`.
    pub actor: String,
    pub action: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chips_delta: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

/// An entry before the log assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEventLogEntry {
    pub turn: u32,
    pub actor: String,
    pub action: String,
    pub timestamp: String,
    pub chips_delta: Option<i64>,
    pub details: Option<JsonValue>,
}

impl NewEventLogEntry {
    pub fn new(
        turn: u32,
        actor: impl Into<String>,
        action: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            turn,
            actor: actor.into(),
            action: action.into(),
            timestamp: timestamp.into(),
            chips_delta: None,
            details: None,
        }
    }

    pub fn with_chips_delta(mut self, delta: i64) -> Self {
        self.chips_delta = Some(delta);
        self
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }
}

pub fn entry_id(turn: u32, sequence: u64) -> String {
    format!("turn-{turn}-log-{sequence}")
}

/// Per-session log. The sequence never resets, so ids are strictly
/// increasing in arrival order.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<EventLogEntry>,
    next_sequence: u64,
}

impl EventLog {
    pub fn append(&mut self, new_entries: Vec<NewEventLogEntry>) -> Vec<EventLogEntry> {
        let mut stored = Vec::with_capacity(new_entries.len());
        for entry in new_entries {
            self.next_sequence += 1;
            let record = EventLogEntry {
                id: entry_id(entry.turn, self.next_sequence),
                turn: entry.turn,
                actor: entry.actor,
                action: entry.action,
                timestamp: entry.timestamp,
                chips_delta: entry.chips_delta,
                details: entry.details,
            };
            self.entries.push(record.clone());
            stored.push(record);
        }
        stored
    }

    /// Entries strictly after `after_id`; everything if absent or unknown.
    pub fn after(&self, after_id: Option<&str>) -> Vec<EventLogEntry> {
        let start = after_id
            .and_then(|id| self.entries.iter().position(|e| e.id == id))
            .map(|pos| pos + 1)
            .unwrap_or(0);
        self.entries[start..].to_vec()
    }

    pub fn entries(&self) -> &[EventLogEntry] {
        &self.entries
    }
}
