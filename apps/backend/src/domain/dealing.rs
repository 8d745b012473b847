//! Deterministic deck preparation.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::rules::{starting_chips, CARD_RANGE, HIDDEN_CARDS, MAX_PLAYERS, MIN_PLAYERS};
use crate::domain::snapshot::Card;
use crate::errors::domain::{DomainError, ValidationKind};

/// Cards and chips handed out when a game starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    /// Remaining draw pile, front first.
    pub deck: Vec<Card>,
    pub discard_hidden: Vec<Card>,
    /// First face-up card.
    pub first_card: Card,
    pub chips_per_player: u32,
}

/// Full ordered deck.
pub fn full_deck() -> Vec<Card> {
    CARD_RANGE.collect()
}

/// Shuffle the deck with `seed`, hide the first cards and reveal the next.
///
/// Same seed and player count always produce the same deal.
pub fn deal(player_count: usize, seed: u64) -> Result<Deal, DomainError> {
    let chips_per_player = starting_chips(player_count).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::InvalidPlayerCount,
            format!("Player count must be {MIN_PLAYERS}..={MAX_PLAYERS}, got {player_count}"),
        )
    })?;

    let mut deck = full_deck();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    deck.shuffle(&mut rng);

    let mut rest = deck.split_off(HIDDEN_CARDS);
    let discard_hidden = deck;
    let first_card = rest.remove(0);

    Ok(Deal {
        deck: rest,
        discard_hidden,
        first_card,
        chips_per_player,
    })
}
