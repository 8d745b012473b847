//! Test-only snapshot builder for domain unit tests.

use std::collections::BTreeMap;

use crate::domain::snapshot::{Card, GameSnapshot, Phase, PlayerProfile, TurnState};

pub const T0: &str = "2026-01-01T00:00:00Z";

/// Knobs for [`running_snapshot`]. Players are taken from `chips` in order.
pub struct RunningSnapshotArgs {
    pub chips: Vec<(&'static str, u32)>,
    pub hands: Vec<(&'static str, Vec<Card>)>,
    pub deck: Vec<Card>,
    pub discard_hidden: Vec<Card>,
    pub card_in_center: Option<Card>,
    pub central_pot: u32,
    pub current_index: usize,
    pub turn: u32,
    pub phase: Phase,
}

impl Default for RunningSnapshotArgs {
    fn default() -> Self {
        Self {
            chips: vec![("alice", 11), ("bob", 11), ("carl", 11)],
            hands: Vec::new(),
            deck: vec![4, 5],
            discard_hidden: Vec::new(),
            card_in_center: Some(3),
            central_pot: 0,
            current_index: 0,
            turn: 1,
            phase: Phase::Running,
        }
    }
}

/// Build a running snapshot without going through setup.
pub fn running_snapshot(args: RunningSnapshotArgs) -> GameSnapshot {
    let order: Vec<String> = args.chips.iter().map(|(id, _)| id.to_string()).collect();
    let players = order
        .iter()
        .map(|id| PlayerProfile {
            id: id.clone(),
            display_name: id.to_uppercase(),
        })
        .collect();
    let chips: BTreeMap<String, u32> = args
        .chips
        .iter()
        .map(|(id, c)| (id.to_string(), *c))
        .collect();
    let mut hands: BTreeMap<String, Vec<Card>> =
        order.iter().map(|id| (id.clone(), Vec::new())).collect();
    for (id, cards) in args.hands {
        hands.insert(id.to_string(), cards);
    }
    let awaiting = args.phase == Phase::Running && args.card_in_center.is_some();

    GameSnapshot {
        session_id: "session-test".to_string(),
        phase: args.phase,
        deck: args.deck,
        discard_hidden: args.discard_hidden,
        player_order: order.clone(),
        rng_seed: 42,
        players,
        chips,
        hands,
        central_pot: args.central_pot,
        turn_state: TurnState {
            turn: args.turn,
            current_player_id: order.get(args.current_index).cloned(),
            current_player_index: Some(args.current_index),
            card_in_center: if awaiting { args.card_in_center } else { None },
            awaiting_action: awaiting,
            deadline: awaiting.then(|| "2026-01-01T00:00:30Z".to_string()),
        },
        created_at: T0.to_string(),
        updated_at: T0.to_string(),
        final_results: None,
    }
}
