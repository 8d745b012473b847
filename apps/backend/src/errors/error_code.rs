//! Error codes for the game backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Player tried to place a chip with none left
    ChipInsufficient,
    /// Operation not valid in the session's current phase
    PhaseMismatch,
    /// Too few or too many players to start
    InvalidPlayerCount,
    /// Malformed command payload
    InvalidCommand,
    /// General validation error
    ValidationError,
    /// Invalid or missing HTTP header
    InvalidHeader,

    // Resource Not Found
    /// Session not found
    SessionNotFound,
    /// Player not found in the session
    PlayerNotFound,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    /// Command built against a stale version
    StateVersionMismatch,
    /// Not this player's turn, or nothing to act on
    TurnNotAvailable,
    /// Session already completed
    GameAlreadyCompleted,
    /// Session id already in use
    SessionExists,
    /// Player already joined this session
    PlayerAlreadyJoined,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    /// Store bookkeeping used before the session was saved
    SessionNotInitialized,
    /// Snapshot serialization failed
    Serialization,
    /// Internal server error
    Internal,
    /// Internal server error (explicit problem code)
    InternalError,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ChipInsufficient => "CHIP_INSUFFICIENT",
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::InvalidPlayerCount => "INVALID_PLAYER_COUNT",
            Self::InvalidCommand => "INVALID_COMMAND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidHeader => "INVALID_HEADER",

            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::StateVersionMismatch => "STATE_VERSION_MISMATCH",
            Self::TurnNotAvailable => "TURN_NOT_AVAILABLE",
            Self::GameAlreadyCompleted => "GAME_ALREADY_COMPLETED",
            Self::SessionExists => "SESSION_EXISTS",
            Self::PlayerAlreadyJoined => "PLAYER_ALREADY_JOINED",
            Self::Conflict => "CONFLICT",

            Self::SessionNotInitialized => "SESSION_NOT_INITIALIZED",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
