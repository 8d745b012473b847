use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::GameConfig;
use crate::error::AppError;
use crate::services::{LobbyService, SessionUpdateHub, TurnEngine};
use crate::state::app_state::AppState;
use crate::store::SessionStore;
use crate::timers::{Clock, Scheduler, SystemClock, TimerSupervisor, TokioScheduler};

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    config: GameConfig,
    clock: Option<Arc<dyn Clock>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    store: Option<Arc<SessionStore>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            clock: None,
            scheduler: None,
            store: None,
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Start from an already populated store (e.g. after a restart).
    pub fn with_store(mut self, store: Arc<SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Wire everything together. Without an injected scheduler this must run
    /// inside a tokio runtime.
    pub fn build(self) -> Result<AppState, AppError> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let scheduler = match self.scheduler {
            Some(scheduler) => scheduler,
            None => {
                let handle = Handle::try_current().map_err(|e| {
                    AppError::config(format!("Timer scheduler needs a tokio runtime: {e}"))
                })?;
                Arc::new(TokioScheduler::new(handle))
            }
        };
        let store = self.store.unwrap_or_else(|| Arc::new(SessionStore::new()));
        let updates = Arc::new(SessionUpdateHub::new());
        let timers = Arc::new(TimerSupervisor::new(
            store.clone(),
            scheduler,
            clock.clone(),
        ));
        let engine = TurnEngine::new(
            store.clone(),
            timers.clone(),
            clock.clone(),
            updates.clone(),
            self.config,
        );
        let lobby = Arc::new(LobbyService::new(
            store.clone(),
            timers.clone(),
            clock.clone(),
            updates.clone(),
            self.config,
        ));

        Ok(AppState {
            store,
            timers,
            engine,
            lobby,
            updates,
            clock,
            config: self.config,
        })
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
