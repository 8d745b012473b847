use std::sync::Arc;

use crate::config::GameConfig;
use crate::services::{LobbyService, SessionUpdateHub, TurnEngine};
use crate::store::SessionStore;
use crate::timers::{Clock, TimerSupervisor};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub timers: Arc<TimerSupervisor>,
    pub engine: Arc<TurnEngine>,
    pub lobby: Arc<LobbyService>,
    pub updates: Arc<SessionUpdateHub>,
    pub clock: Arc<dyn Clock>,
    pub config: GameConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
