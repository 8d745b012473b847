//! Authoritative session state: the snapshot stored per session.
//!
//! Maps are `BTreeMap`s so the serialized form has a stable key order; the
//! store hashes that serialization to produce the snapshot version.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Face value of a card (3..=35 in a standard deck).
pub type Card = u8;

/// Opaque player identity chosen by the caller.
pub type PlayerId = String;

/// Actor name used for timeout-forced commands and lifecycle log entries.
pub const SYSTEM_ACTOR: &str = "system";

/// Session progression. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting room: players may join.
    Setup,
    Running,
    Completed,
}

impl Phase {
    /// Whether moving from `self` to `next` is a legal forward step.
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Setup, Phase::Running) | (Phase::Running, Phase::Completed)
        )
    }
}

/// Public info about a joined player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub display_name: String,
}

/// Whose turn it is and what they are deciding on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnState {
    /// Incremented once per revealed card.
    pub turn: u32,
    pub current_player_id: Option<PlayerId>,
    /// Index into `player_order`, consistent with `current_player_id`.
    pub current_player_index: Option<usize>,
    pub card_in_center: Option<Card>,
    pub awaiting_action: bool,
    /// RFC 3339 due time; present only while awaiting action.
    pub deadline: Option<String>,
}

impl TurnState {
    pub fn idle() -> Self {
        Self {
            turn: 0,
            current_player_id: None,
            current_player_index: None,
            card_in_center: None,
            awaiting_action: false,
            deadline: None,
        }
    }
}

/// One player's final standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub rank: u32,
    pub player_id: PlayerId,
    pub score: i32,
    pub chips_remaining: u32,
    /// Collected cards, sorted ascending.
    pub cards: Vec<Card>,
    /// Maximal runs of consecutive values.
    pub card_sets: Vec<Vec<Card>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TieBreakReason {
    ChipCount,
}

/// Report on the first shared score; `winner` is `None` if chips tie too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TieBreak {
    pub reason: TieBreakReason,
    pub tied_score: i32,
    pub contenders: Vec<PlayerId>,
    pub winner: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub placements: Vec<Placement>,
    pub tie_break: Option<TieBreak>,
}

/// The single authoritative state of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub session_id: String,
    pub phase: Phase,
    /// Draw from the front.
    pub deck: Vec<Card>,
    /// Removed from play, never revealed.
    pub discard_hidden: Vec<Card>,
    pub player_order: Vec<PlayerId>,
    pub rng_seed: u64,
    /// Join order.
    pub players: Vec<PlayerProfile>,
    pub chips: BTreeMap<PlayerId, u32>,
    /// Collected cards in append order.
    pub hands: BTreeMap<PlayerId, Vec<Card>>,
    pub central_pot: u32,
    pub turn_state: TurnState,
    pub created_at: String,
    pub updated_at: String,
    pub final_results: Option<ScoreSummary>,
}

impl GameSnapshot {
    /// Fresh waiting-room snapshot.
    pub fn new_setup(session_id: impl Into<String>, rng_seed: u64, now: String) -> Self {
        Self {
            session_id: session_id.into(),
            phase: Phase::Setup,
            deck: Vec::new(),
            discard_hidden: Vec::new(),
            player_order: Vec::new(),
            rng_seed,
            players: Vec::new(),
            chips: BTreeMap::new(),
            hands: BTreeMap::new(),
            central_pot: 0,
            turn_state: TurnState::idle(),
            created_at: now.clone(),
            updated_at: now,
            final_results: None,
        }
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    /// Total chips in circulation (players plus pot).
    pub fn total_chips(&self) -> u32 {
        self.chips.values().sum::<u32>() + self.central_pot
    }

    /// Every card currently accounted for, in no particular order.
    pub fn all_cards(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .deck
            .iter()
            .chain(self.discard_hidden.iter())
            .chain(self.hands.values().flatten())
            .copied()
            .collect();
        cards.extend(self.turn_state.card_in_center);
        cards
    }

    /// Summary row for enumeration.
    pub fn summary(&self, version: &str) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            phase: self.phase,
            version: version.to_string(),
            updated_at: self.updated_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub phase: Phase,
    pub version: String,
    pub updated_at: String,
}
