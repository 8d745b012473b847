//! Turn decision engine: the only writer of in-game state.
//!
//! Every command runs under the session's command lock. Validation happens
//! against the stored snapshot; mutation happens on a private copy that is
//! swapped in by a single save, so readers never see a half-applied turn.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::domain::rules::next_seat;
use crate::domain::{
    calculate_score_summary, collect_central_pot_for_player, ensure_chip_action_allowed,
    place_chip_into_center, Card, GameSnapshot, Phase, PlayerAction, SYSTEM_ACTOR,
};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::errors::ErrorCode;
use crate::services::{deadline_after, SessionUpdateHub};
use crate::store::{NewEventLogEntry, SessionEnvelope, SessionStore, VersionedSnapshot};
use crate::timers::{format_timestamp, parse_timestamp, Clock, TimeoutHandler, TimerSupervisor};

/// A request to mutate a running game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub session_id: String,
    /// Caller-chosen idempotency key.
    pub command_id: String,
    /// Version the caller last observed.
    pub expected_version: String,
    /// Acting player, or `"system"` to act for whoever is current.
    pub player_id: String,
    pub action: PlayerAction,
}

/// Where a command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Client,
    /// Fired by the turn timer; only valid once the stored deadline has passed.
    Deadline,
}

/// What a single action did, for the event log.
struct Applied {
    card: Card,
    pot_before: u32,
    chips_delta: i64,
    completed: bool,
}

pub struct TurnEngine {
    store: Arc<SessionStore>,
    timers: Arc<TimerSupervisor>,
    clock: Arc<dyn Clock>,
    updates: Arc<SessionUpdateHub>,
    config: GameConfig,
}

impl TurnEngine {
    /// Build the engine and install it as the supervisor's timeout handler.
    pub fn new(
        store: Arc<SessionStore>,
        timers: Arc<TimerSupervisor>,
        clock: Arc<dyn Clock>,
        updates: Arc<SessionUpdateHub>,
        config: GameConfig,
    ) -> Arc<Self> {
        let engine = Arc::new(Self {
            store,
            timers,
            clock,
            updates,
            config,
        });
        let handler: Weak<dyn TimeoutHandler> = Arc::downgrade(&engine) as Weak<dyn TimeoutHandler>;
        if !engine.timers.set_timeout_handler(handler) {
            warn!("timer supervisor already has a timeout handler; keeping the existing one");
        }
        engine
    }

    /// Validate and apply one command.
    ///
    /// A command id seen before returns the current state unchanged. Every
    /// failure is raised before anything is mutated.
    pub async fn apply_command(&self, command: Command) -> Result<VersionedSnapshot, DomainError> {
        self.apply(command, Origin::Client).await
    }

    async fn apply(
        &self,
        command: Command,
        origin: Origin,
    ) -> Result<VersionedSnapshot, DomainError> {
        if command.command_id.trim().is_empty() {
            return Err(DomainError::validation(
                ValidationKind::InvalidCommand,
                "commandId must not be empty",
            ));
        }

        let envelope = self
            .store
            .get_envelope(&command.session_id)
            .ok_or_else(|| DomainError::session_not_found(&command.session_id))?;
        let _guard = envelope.lock_commands().await;

        if envelope.has_processed(&command.command_id) {
            debug!(
                session_id = %command.session_id,
                command_id = %command.command_id,
                "replayed command; returning current state"
            );
            return Ok(envelope.versioned());
        }

        let current = envelope.versioned();
        if current.version != command.expected_version {
            return Err(DomainError::conflict(
                ConflictKind::StateVersionMismatch,
                format!(
                    "Session {} is at version {}, command expected {}",
                    command.session_id, current.version, command.expected_version
                ),
            ));
        }

        let mut next = current.snapshot;
        let actor = Self::acting_player(&next, &command)?;
        if origin == Origin::Deadline {
            self.ensure_deadline_passed(&next)?;
        }
        ensure_chip_action_allowed(&next, &actor, command.action)?;

        let turn = next.turn_state.turn;
        let applied = match command.action {
            PlayerAction::PlaceChip => self.place_chip(&mut next, &actor)?,
            PlayerAction::TakeCard => self.take_card(&mut next, &actor)?,
        };
        next.updated_at = format_timestamp(self.clock.now());

        let version = self.commit(&envelope, &next, &command, &actor, turn, &applied)?;

        info!(
            session_id = %command.session_id,
            command_id = %command.command_id,
            player_id = %actor,
            action = command.action.as_str(),
            %version,
            completed = applied.completed,
            "command applied"
        );

        Ok(VersionedSnapshot {
            snapshot: next,
            version,
        })
    }

    /// Phase and turn-ownership checks. Returns the player the action is
    /// applied to.
    fn acting_player(snapshot: &GameSnapshot, command: &Command) -> Result<String, DomainError> {
        match snapshot.phase {
            Phase::Completed => {
                return Err(DomainError::conflict(
                    ConflictKind::GameAlreadyCompleted,
                    format!("Session {} has already completed", snapshot.session_id),
                ))
            }
            Phase::Setup => {
                return Err(DomainError::conflict(
                    ConflictKind::TurnNotAvailable,
                    format!("Session {} has not started", snapshot.session_id),
                ))
            }
            Phase::Running => {}
        }

        let turn = &snapshot.turn_state;
        let current = match (&turn.current_player_id, turn.awaiting_action) {
            (Some(current), true) => current,
            _ => {
                return Err(DomainError::conflict(
                    ConflictKind::TurnNotAvailable,
                    "No turn is awaiting action",
                ))
            }
        };

        if command.player_id != SYSTEM_ACTOR && command.player_id != *current {
            return Err(DomainError::conflict(
                ConflictKind::TurnNotAvailable,
                format!(
                    "It is {current}'s turn, not {}'s",
                    command.player_id
                ),
            ));
        }
        Ok(current.clone())
    }

    /// Timeouts only resolve a turn whose stored deadline has passed.
    fn ensure_deadline_passed(&self, snapshot: &GameSnapshot) -> Result<(), DomainError> {
        let due = snapshot
            .turn_state
            .deadline
            .as_deref()
            .and_then(parse_timestamp);
        match due {
            Some(due) if self.clock.now() >= due => Ok(()),
            Some(due) => Err(DomainError::conflict(
                ConflictKind::TurnNotAvailable,
                format!(
                    "Turn deadline {} for session {} has not passed",
                    format_timestamp(due),
                    snapshot.session_id
                ),
            )),
            None => Err(DomainError::conflict(
                ConflictKind::TurnNotAvailable,
                format!("Session {} has no turn deadline", snapshot.session_id),
            )),
        }
    }

    fn card_in_center(snapshot: &GameSnapshot) -> Result<Card, DomainError> {
        snapshot.turn_state.card_in_center.ok_or_else(|| {
            DomainError::conflict(ConflictKind::TurnNotAvailable, "No card is face up")
        })
    }

    fn place_chip(&self, next: &mut GameSnapshot, actor: &str) -> Result<Applied, DomainError> {
        let card = Self::card_in_center(next)?;
        let pot_before = next.central_pot;
        let notice = place_chip_into_center(next, actor)?;

        let seat = next
            .player_order
            .iter()
            .position(|id| id == actor)
            .or(next.turn_state.current_player_index)
            .unwrap_or(0);
        let following = next_seat(seat, next.player_order.len());
        let turn_state = &mut next.turn_state;
        turn_state.current_player_index = Some(following);
        turn_state.current_player_id = next.player_order.get(following).cloned();
        turn_state.deadline = Some(deadline_after(self.clock.now(), self.config.turn_timeout));

        Ok(Applied {
            card,
            pot_before,
            chips_delta: notice.chips_delta,
            completed: false,
        })
    }

    fn take_card(&self, next: &mut GameSnapshot, actor: &str) -> Result<Applied, DomainError> {
        let card = Self::card_in_center(next)?;
        let pot_before = next.central_pot;
        let chips_delta = collect_central_pot_for_player(next, actor)?
            .map(|notice| notice.chips_delta)
            .unwrap_or(0);
        next.hands.entry(actor.to_string()).or_default().push(card);

        let completed = next.deck.is_empty();
        if completed {
            next.turn_state.card_in_center = None;
            next.turn_state.awaiting_action = false;
            next.turn_state.deadline = None;
            next.phase = Phase::Completed;
            next.final_results = Some(calculate_score_summary(next));
        } else {
            let revealed = next.deck.remove(0);
            let turn_state = &mut next.turn_state;
            turn_state.turn += 1;
            turn_state.card_in_center = Some(revealed);
            turn_state.deadline =
                Some(deadline_after(self.clock.now(), self.config.turn_timeout));
        }

        Ok(Applied {
            card,
            pot_before,
            chips_delta,
            completed,
        })
    }

    /// Save, record and announce. Runs with the command lock held.
    fn commit(
        &self,
        envelope: &SessionEnvelope,
        next: &GameSnapshot,
        command: &Command,
        actor: &str,
        turn: u32,
        applied: &Applied,
    ) -> Result<String, DomainError> {
        let session_id = envelope.session_id();
        let saved = self.store.save_snapshot(next)?;
        let version = saved.version();
        self.store
            .mark_command_processed(session_id, &command.command_id)?;

        let entry = NewEventLogEntry::new(
            turn,
            command.player_id.clone(),
            command.action.as_str(),
            next.updated_at.clone(),
        )
        .with_chips_delta(applied.chips_delta)
        .with_details(json!({
            "card": applied.card,
            "centralPotBefore": applied.pot_before,
            "centralPotAfter": next.central_pot,
            "targetPlayer": actor,
            "nextCard": next.turn_state.card_in_center,
            "gameCompleted": applied.completed,
        }));
        self.store.append_event_log(session_id, vec![entry])?;

        if next.phase == Phase::Running && next.turn_state.awaiting_action {
            self.timers
                .register(session_id, next.turn_state.deadline.as_deref());
        } else {
            self.timers.clear(session_id);
        }
        self.updates.publish(session_id, &version);
        Ok(version)
    }
}

#[async_trait]
impl TimeoutHandler for TurnEngine {
    async fn on_timeout(&self, session_id: String) {
        let Some(envelope) = self.store.get_envelope(&session_id) else {
            debug!(%session_id, "timeout for unknown session");
            return;
        };
        let version = envelope.version();
        let command = Command {
            command_id: format!("timeout:{session_id}:{version}"),
            session_id: session_id.clone(),
            expected_version: version,
            player_id: SYSTEM_ACTOR.to_string(),
            action: PlayerAction::TakeCard,
        };

        match self.apply(command, Origin::Deadline).await {
            Ok(result) => {
                info!(%session_id, version = %result.version, "turn timed out; card taken")
            }
            Err(err) => match err.code() {
                ErrorCode::StateVersionMismatch
                | ErrorCode::TurnNotAvailable
                | ErrorCode::GameAlreadyCompleted => {
                    debug!(%session_id, error = %err, "timeout lost the race; discarded")
                }
                _ => warn!(%session_id, error = %err, "timeout command failed"),
            },
        }
    }
}
