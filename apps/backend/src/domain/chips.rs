//! Chip ledger: invariant-preserving chip transfers against a snapshot.
//!
//! Chips only ever move player -> pot or pot -> player, so the total in
//! circulation is constant. These functions run inside the turn engine's
//! session lock and have no concurrency concerns of their own.

use serde::{Deserialize, Serialize};

use crate::domain::action::PlayerAction;
use crate::domain::snapshot::GameSnapshot;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChipMovement {
    #[serde(rename = "chip.place")]
    Place,
    #[serde(rename = "chip.collect")]
    Collect,
}

/// Record of a single chip transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChipNotification {
    #[serde(rename = "type")]
    pub movement: ChipMovement,
    pub player_id: String,
    pub chips_delta: i64,
    pub resulting_chips: u32,
    pub central_pot: u32,
}

fn player_chips(snapshot: &GameSnapshot, player_id: &str) -> Result<u32, DomainError> {
    snapshot.chips.get(player_id).copied().ok_or_else(|| {
        DomainError::not_found(
            NotFoundKind::Player,
            format!("Player {player_id} has no chip account in this session"),
        )
    })
}

fn insufficient(player_id: &str) -> DomainError {
    DomainError::validation(
        ValidationKind::ChipInsufficient,
        format!("Player {player_id} has no chips left to place"),
    )
}

/// Check that `player_id` may perform `action` given their chip count.
///
/// Taking a card is always allowed; placing a chip needs at least one.
pub fn ensure_chip_action_allowed(
    snapshot: &GameSnapshot,
    player_id: &str,
    action: PlayerAction,
) -> Result<(), DomainError> {
    let chips = player_chips(snapshot, player_id)?;
    if action == PlayerAction::PlaceChip && chips == 0 {
        return Err(insufficient(player_id));
    }
    Ok(())
}

/// Move one chip from the player into the central pot.
pub fn place_chip_into_center(
    snapshot: &mut GameSnapshot,
    player_id: &str,
) -> Result<ChipNotification, DomainError> {
    let chips = player_chips(snapshot, player_id)?;
    if chips == 0 {
        return Err(insufficient(player_id));
    }
    let resulting_chips = chips - 1;
    snapshot.chips.insert(player_id.to_string(), resulting_chips);
    snapshot.central_pot += 1;

    Ok(ChipNotification {
        movement: ChipMovement::Place,
        player_id: player_id.to_string(),
        chips_delta: -1,
        resulting_chips,
        central_pot: snapshot.central_pot,
    })
}

/// Hand the whole pot to the player. An empty pot is a no-op, not an error.
pub fn collect_central_pot_for_player(
    snapshot: &mut GameSnapshot,
    player_id: &str,
) -> Result<Option<ChipNotification>, DomainError> {
    let chips = player_chips(snapshot, player_id)?;
    let pot = snapshot.central_pot;
    if pot == 0 {
        return Ok(None);
    }
    let resulting_chips = chips + pot;
    snapshot.chips.insert(player_id.to_string(), resulting_chips);
    snapshot.central_pot = 0;

    Ok(Some(ChipNotification {
        movement: ChipMovement::Collect,
        player_id: player_id.to_string(),
        chips_delta: i64::from(pot),
        resulting_chips,
        central_pot: 0,
    }))
}
