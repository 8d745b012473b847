//! Session store: the root of truth for every live session.

pub mod envelope;
pub mod event_log;
pub mod session_store;
pub mod version;

pub use envelope::{SessionEnvelope, VersionedSnapshot};
pub use event_log::{EventLogEntry, NewEventLogEntry};
pub use session_store::SessionStore;
pub use version::compute_version;
