//! Scheduler seam: run a callback after a delay, cancel by handle.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

pub type TimerCallback = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Opaque reference to a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

pub trait Scheduler: Send + Sync + 'static {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;

    /// Cancelling an unknown or already-fired handle is a no-op.
    fn cancel(&self, handle: &TimerHandle);
}

/// Spawns one sleeping task per timer on a tokio runtime.
pub struct TokioScheduler {
    runtime: Handle,
    next_id: AtomicU64,
    tasks: Arc<DashMap<u64, tokio::task::AbortHandle>>,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            tasks: Arc::new(DashMap::new()),
        }
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = self.tasks.clone();
        // The task waits until its abort handle is registered, so a fired
        // timer has always removed its own entry before the callback runs.
        let (armed_tx, armed_rx) = oneshot::channel::<()>();
        let join = self.runtime.spawn(async move {
            if armed_rx.await.is_err() {
                return;
            }
            tokio::time::sleep(delay).await;
            tasks.remove(&id);
            callback().await;
        });
        self.tasks.insert(id, join.abort_handle());
        let _ = armed_tx.send(());
        TimerHandle(id)
    }

    fn cancel(&self, handle: &TimerHandle) {
        if let Some((_, task)) = self.tasks.remove(&handle.0) {
            task.abort();
        }
    }
}

struct PendingTimer {
    delay: Duration,
    callback: TimerCallback,
}

/// Scheduler that never fires on its own; tests fire callbacks explicitly.
#[derive(Default)]
pub struct ManualScheduler {
    next_id: AtomicU64,
    pending: Mutex<BTreeMap<u64, PendingTimer>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Handles and delays of every pending timer, oldest first.
    pub fn pending(&self) -> Vec<(TimerHandle, Duration)> {
        self.pending
            .lock()
            .iter()
            .map(|(id, timer)| (TimerHandle(*id), timer.delay))
            .collect()
    }

    /// Run one pending callback. Returns false if it was cancelled or fired.
    pub async fn fire(&self, handle: &TimerHandle) -> bool {
        let timer = self.pending.lock().remove(&handle.0);
        match timer {
            Some(timer) => {
                (timer.callback)().await;
                true
            }
            None => false,
        }
    }

    /// Run every currently pending callback; returns how many ran.
    pub async fn fire_all(&self) -> usize {
        let drained: Vec<PendingTimer> = {
            let mut pending = self.pending.lock();
            std::mem::take(&mut *pending).into_values().collect()
        };
        let count = drained.len();
        for timer in drained {
            (timer.callback)().await;
        }
        count
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.pending
            .lock()
            .insert(id, PendingTimer { delay, callback });
        TimerHandle(id)
    }

    fn cancel(&self, handle: &TimerHandle) {
        self.pending.lock().remove(&handle.0);
    }
}
