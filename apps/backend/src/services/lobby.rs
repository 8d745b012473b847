//! Session lifecycle before play: create, join, start.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::config::GameConfig;
use crate::domain::dealing::deal;
use crate::domain::rules::MAX_PLAYERS;
use crate::domain::{GameSnapshot, Phase, PlayerProfile, TurnState, SYSTEM_ACTOR};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::services::{deadline_after, SessionUpdateHub};
use crate::store::{NewEventLogEntry, SessionEnvelope, SessionStore, VersionedSnapshot};
use crate::timers::{format_timestamp, Clock, TimerSupervisor};

pub struct LobbyService {
    store: Arc<SessionStore>,
    timers: Arc<TimerSupervisor>,
    clock: Arc<dyn Clock>,
    updates: Arc<SessionUpdateHub>,
    config: GameConfig,
}

fn require_identifier(value: &str, what: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(
            ValidationKind::InvalidCommand,
            format!("{what} must not be empty"),
        ));
    }
    Ok(())
}

fn phase_mismatch(snapshot: &GameSnapshot, wanted: &str) -> DomainError {
    DomainError::validation(
        ValidationKind::PhaseMismatch,
        format!(
            "Session {} is {:?}; {wanted} requires setup",
            snapshot.session_id, snapshot.phase
        ),
    )
}

impl LobbyService {
    pub fn new(
        store: Arc<SessionStore>,
        timers: Arc<TimerSupervisor>,
        clock: Arc<dyn Clock>,
        updates: Arc<SessionUpdateHub>,
        config: GameConfig,
    ) -> Self {
        Self {
            store,
            timers,
            clock,
            updates,
            config,
        }
    }

    /// Open a waiting room. A random seed is drawn when none is given.
    pub async fn create_session(
        &self,
        session_id: &str,
        rng_seed: Option<u64>,
    ) -> Result<VersionedSnapshot, DomainError> {
        require_identifier(session_id, "sessionId")?;
        let now = format_timestamp(self.clock.now());
        let seed = rng_seed.unwrap_or_else(rand::random);
        let snapshot = GameSnapshot::new_setup(session_id, seed, now.clone());

        let envelope = self.store.insert_new(&snapshot)?;
        let _guard = envelope.lock_commands().await;
        self.store.append_event_log(
            session_id,
            vec![NewEventLogEntry::new(0, SYSTEM_ACTOR, "sessionCreated", now)],
        )?;
        let created = envelope.versioned();
        self.updates.publish(session_id, &created.version);

        info!(session_id, version = %created.version, "session created");
        Ok(created)
    }

    /// Seat a player in join order.
    pub async fn join_session(
        &self,
        session_id: &str,
        player_id: &str,
        display_name: Option<String>,
    ) -> Result<VersionedSnapshot, DomainError> {
        require_identifier(player_id, "playerId")?;
        if player_id == SYSTEM_ACTOR {
            return Err(DomainError::validation(
                ValidationKind::InvalidCommand,
                format!("'{SYSTEM_ACTOR}' is reserved"),
            ));
        }

        let envelope = self.require_envelope(session_id)?;
        let _guard = envelope.lock_commands().await;
        let mut next = envelope.snapshot();

        if next.phase != Phase::Setup {
            return Err(phase_mismatch(&next, "joining"));
        }
        if next.has_player(player_id) {
            return Err(DomainError::conflict(
                ConflictKind::PlayerAlreadyJoined,
                format!("Player {player_id} already joined session {session_id}"),
            ));
        }
        if next.players.len() >= MAX_PLAYERS {
            return Err(DomainError::validation(
                ValidationKind::InvalidPlayerCount,
                format!("Session {session_id} already has {MAX_PLAYERS} players"),
            ));
        }

        let display_name = display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| player_id.to_string());
        next.players.push(PlayerProfile {
            id: player_id.to_string(),
            display_name: display_name.clone(),
        });
        next.updated_at = format_timestamp(self.clock.now());

        let entry = NewEventLogEntry::new(0, player_id, "playerJoined", next.updated_at.clone())
            .with_details(json!({ "displayName": display_name }));
        let joined = self.commit(&envelope, next, entry)?;

        info!(session_id, player_id, version = %joined.version, "player joined");
        Ok(joined)
    }

    /// Deal and open the first turn.
    pub async fn start_session(&self, session_id: &str) -> Result<VersionedSnapshot, DomainError> {
        let envelope = self.require_envelope(session_id)?;
        let _guard = envelope.lock_commands().await;
        let mut next = envelope.snapshot();

        if !next.phase.can_transition_to(Phase::Running) {
            return Err(phase_mismatch(&next, "starting"));
        }

        let dealt = deal(next.players.len(), next.rng_seed)?;
        let order: Vec<String> = next.players.iter().map(|p| p.id.clone()).collect();
        let now = self.clock.now();

        next.chips = order
            .iter()
            .map(|id| (id.clone(), dealt.chips_per_player))
            .collect::<BTreeMap<_, _>>();
        next.hands = order.iter().map(|id| (id.clone(), Vec::new())).collect();
        next.deck = dealt.deck;
        next.discard_hidden = dealt.discard_hidden;
        next.central_pot = 0;
        next.turn_state = TurnState {
            turn: 1,
            current_player_id: order.first().cloned(),
            current_player_index: Some(0),
            card_in_center: Some(dealt.first_card),
            awaiting_action: true,
            deadline: Some(deadline_after(now, self.config.turn_timeout)),
        };
        next.player_order = order;
        next.phase = Phase::Running;
        next.updated_at = format_timestamp(now);

        let entry = NewEventLogEntry::new(1, SYSTEM_ACTOR, "gameStarted", next.updated_at.clone())
            .with_details(json!({
                "playerOrder": next.player_order,
                "chipsPerPlayer": dealt.chips_per_player,
                "firstCard": dealt.first_card,
            }));
        let deadline = next.turn_state.deadline.clone();
        let started = self.commit(&envelope, next, entry)?;
        self.timers.register(session_id, deadline.as_deref());

        info!(
            session_id,
            players = started.snapshot.player_order.len(),
            version = %started.version,
            "game started"
        );
        Ok(started)
    }

    fn require_envelope(&self, session_id: &str) -> Result<Arc<SessionEnvelope>, DomainError> {
        self.store
            .get_envelope(session_id)
            .ok_or_else(|| DomainError::session_not_found(session_id))
    }

    fn commit(
        &self,
        envelope: &SessionEnvelope,
        next: GameSnapshot,
        entry: NewEventLogEntry,
    ) -> Result<VersionedSnapshot, DomainError> {
        let session_id = envelope.session_id();
        let version = self.store.save_snapshot(&next)?.version();
        self.store.append_event_log(session_id, vec![entry])?;
        self.updates.publish(session_id, &version);
        Ok(VersionedSnapshot {
            snapshot: next,
            version,
        })
    }
}
