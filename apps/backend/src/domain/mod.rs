//! Domain layer: pure game logic types and helpers.

pub mod action;
pub mod chips;
pub mod dealing;
pub mod rules;
pub mod scoring;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_state_helpers;
#[cfg(test)]
mod tests_props_chips;
#[cfg(test)]
mod tests_scoring;

// Re-exports for ergonomics
pub use action::PlayerAction;
pub use chips::{
    collect_central_pot_for_player, ensure_chip_action_allowed, place_chip_into_center,
    ChipNotification,
};
pub use scoring::calculate_score_summary;
pub use snapshot::{
    Card, GameSnapshot, Phase, Placement, PlayerId, PlayerProfile, ScoreSummary,
    SessionSummary, TieBreak, TurnState, SYSTEM_ACTOR,
};
