//! Deterministic application state for integration tests: a manual clock and
//! a manual scheduler, so deadlines only fire when a test says so.

use std::sync::Arc;

use backend::domain::{Phase, PlayerAction};
use backend::infra::state::build_state;
use backend::{AppState, Command, ManualClock, ManualScheduler, VersionedSnapshot};
use time::macros::datetime;
use time::OffsetDateTime;

pub const T0: OffsetDateTime = datetime!(2026-01-01 0:00 UTC);

pub struct Harness {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub scheduler: Arc<ManualScheduler>,
}

pub fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(T0));
    let scheduler = Arc::new(ManualScheduler::new());
    let state = build_state()
        .with_clock(clock.clone())
        .with_scheduler(scheduler.clone())
        .build()
        .expect("state builds with injected clock and scheduler");
    Harness {
        state,
        clock,
        scheduler,
    }
}

/// Create, seat `players` and start `session_id`.
pub async fn running_game(
    h: &Harness,
    session_id: &str,
    players: &[&str],
    seed: u64,
) -> VersionedSnapshot {
    let lobby = &h.state.lobby;
    lobby
        .create_session(session_id, Some(seed))
        .await
        .expect("create session");
    for player in players {
        lobby
            .join_session(session_id, player, None)
            .await
            .expect("join session");
    }
    let started = lobby.start_session(session_id).await.expect("start session");
    assert_eq!(started.snapshot.phase, Phase::Running);
    started
}

/// A command against the session's current version.
pub fn command(
    h: &Harness,
    session_id: &str,
    command_id: &str,
    player_id: &str,
    action: PlayerAction,
) -> Command {
    let version = h
        .state
        .store
        .get_envelope(session_id)
        .expect("session exists")
        .version();
    Command {
        session_id: session_id.to_string(),
        command_id: command_id.to_string(),
        expected_version: version,
        player_id: player_id.to_string(),
        action,
    }
}
