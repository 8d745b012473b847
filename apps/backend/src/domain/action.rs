use serde::{Deserialize, Serialize};

/// What a player (or the system, on timeout) does with the face-up card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerAction {
    /// Pay one chip into the pot and pass the decision on.
    PlaceChip,
    /// Take the card and everything in the pot.
    TakeCard,
}

impl PlayerAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PlaceChip => "placeChip",
            Self::TakeCard => "takeCard",
        }
    }
}
