//! Turns a snapshot's deadline into a scheduled timeout callback.
//!
//! The supervisor is transport-agnostic: it only knows the store, a clock and
//! a scheduler. Bookkeeping for the live timer sits on the session envelope
//! so it can be inspected and cancelled from anywhere.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::domain::Phase;
use crate::store::SessionStore;
use crate::timers::clock::{parse_timestamp, Clock};
use crate::timers::scheduler::{Scheduler, TimerCallback, TimerHandle};

/// Receives fired deadlines.
#[async_trait]
pub trait TimeoutHandler: Send + Sync {
    async fn on_timeout(&self, session_id: String);
}

/// Live timer bookkeeping stored on the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledDeadline {
    /// Identifies this registration; a fired callback only runs if the slot
    /// still carries its token.
    pub token: u64,
    pub handle: TimerHandle,
    pub due_at: OffsetDateTime,
}

type HandlerSlot = Arc<OnceCell<Weak<dyn TimeoutHandler>>>;

pub struct TimerSupervisor {
    store: Arc<SessionStore>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    handler: HandlerSlot,
    next_token: AtomicU64,
}

impl TimerSupervisor {
    pub fn new(
        store: Arc<SessionStore>,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            scheduler,
            clock,
            handler: Arc::new(OnceCell::new()),
            next_token: AtomicU64::new(1),
        }
    }

    /// Install the callback target. Only the first call wins.
    pub fn set_timeout_handler(&self, handler: Weak<dyn TimeoutHandler>) -> bool {
        self.handler.set(handler).is_ok()
    }

    /// Replace any timer for `session_id` with one due at `deadline`.
    ///
    /// A missing or unparseable deadline just clears the timer.
    pub fn register(&self, session_id: &str, deadline: Option<&str>) {
        let Some(envelope) = self.store.get_envelope(session_id) else {
            debug!(session_id, "no envelope; timer not registered");
            return;
        };

        let mut slot = envelope.deadline_slot();
        if let Some(existing) = slot.take() {
            self.scheduler.cancel(&existing.handle);
        }

        let Some(raw) = deadline else {
            return;
        };
        let Some(due_at) = parse_timestamp(raw) else {
            warn!(session_id, deadline = raw, "unparseable deadline; timer cleared");
            return;
        };

        let remaining = due_at - self.clock.now();
        let delay = std::time::Duration::try_from(remaining).unwrap_or(std::time::Duration::ZERO);
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let callback = self.fire_callback(session_id.to_string(), token);
        let handle = self.scheduler.schedule(delay, callback);

        debug!(session_id, token, delay_ms = delay.as_millis() as u64, "timer registered");
        *slot = Some(ScheduledDeadline {
            token,
            handle,
            due_at,
        });
    }

    /// Cancel any scheduled timer. No-op if none exists or it already fired.
    pub fn clear(&self, session_id: &str) {
        let Some(envelope) = self.store.get_envelope(session_id) else {
            return;
        };
        let existing = envelope.deadline_slot().take();
        if let Some(existing) = existing {
            self.scheduler.cancel(&existing.handle);
            debug!(session_id, token = existing.token, "timer cleared");
        }
    }

    /// Re-arm timers for every session awaiting action; clear the rest.
    ///
    /// Returns how many timers were registered. Deadlines already in the past
    /// are scheduled with zero delay.
    pub fn restore(&self) -> usize {
        let mut registered = 0;
        for summary in self.store.list_sessions() {
            let Some(snapshot) = self.store.get_snapshot(&summary.session_id) else {
                continue;
            };
            let turn = &snapshot.turn_state;
            match (&snapshot.phase, turn.awaiting_action, turn.deadline.as_deref()) {
                (Phase::Running, true, Some(deadline)) if parse_timestamp(deadline).is_some() => {
                    self.register(&summary.session_id, Some(deadline));
                    registered += 1;
                }
                _ => self.clear(&summary.session_id),
            }
        }
        debug!(registered, "timers restored");
        registered
    }

    fn fire_callback(&self, session_id: String, token: u64) -> TimerCallback {
        let store = self.store.clone();
        let handler = self.handler.clone();
        Box::new(move || {
            Box::pin(async move {
                let Some(envelope) = store.get_envelope(&session_id) else {
                    return;
                };
                let claimed = {
                    let mut slot = envelope.deadline_slot();
                    match slot.as_ref() {
                        Some(current) if current.token == token => {
                            *slot = None;
                            true
                        }
                        _ => false,
                    }
                };
                if !claimed {
                    debug!(%session_id, token, "stale timer fired; ignoring");
                    return;
                }

                match handler.get().and_then(Weak::upgrade) {
                    Some(handler) => handler.on_timeout(session_id).await,
                    None => warn!(%session_id, "timer fired with no timeout handler"),
                }
            })
        })
    }
}
