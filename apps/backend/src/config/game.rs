use std::env;

use time::Duration;

use crate::error::AppError;

const DEFAULT_TURN_TIMEOUT_SECS: i64 = 30;

/// Tunables for running games.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// How long the current player has to decide before the system takes the card.
    pub turn_timeout: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Duration::seconds(DEFAULT_TURN_TIMEOUT_SECS),
        }
    }
}

impl GameConfig {
    pub fn with_turn_timeout(turn_timeout: Duration) -> Self {
        Self { turn_timeout }
    }

    /// Read `TURN_TIMEOUT_SECS` (default 30).
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let Some(raw) = lookup("TURN_TIMEOUT_SECS") else {
            return Ok(Self::default());
        };
        let secs = raw.trim().parse::<i64>().map_err(|_| {
            AppError::config(format!(
                "TURN_TIMEOUT_SECS must be a whole number of seconds, got: '{raw}'"
            ))
        })?;
        if secs <= 0 {
            return Err(AppError::config(format!(
                "TURN_TIMEOUT_SECS must be greater than zero, got: {secs}"
            )));
        }
        Ok(Self::with_turn_timeout(Duration::seconds(secs)))
    }
}
