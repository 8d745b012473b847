//! Orchestration over the store: lobby lifecycle, turn commands and change
//! notifications.

use time::{Duration, OffsetDateTime};

use crate::timers::format_timestamp;

pub mod lobby;
pub mod turn_engine;
pub mod updates;

pub use lobby::LobbyService;
pub use turn_engine::{Command, TurnEngine};
pub use updates::{SessionUpdate, SessionUpdateHub};

/// RFC 3339 deadline `timeout` after `now`.
pub(crate) fn deadline_after(now: OffsetDateTime, timeout: Duration) -> String {
    format_timestamp(now + timeout)
}
