#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod http;
pub mod infra;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod timers;

// Re-exports for public API
pub use config::GameConfig;
pub use error::AppError;
pub use errors::{DomainError, ErrorCode};
pub use infra::state::{build_state, StateBuilder};
pub use services::{Command, LobbyService, SessionUpdate, SessionUpdateHub, TurnEngine};
pub use state::app_state::AppState;
pub use store::{SessionEnvelope, SessionStore, VersionedSnapshot};
pub use timers::{Clock, ManualClock, ManualScheduler, Scheduler, TimerSupervisor};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
