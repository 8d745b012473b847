//! Deadline scheduling, independent of any transport.

pub mod clock;
pub mod scheduler;
pub mod supervisor;

pub use clock::{format_timestamp, parse_timestamp, Clock, ManualClock, SystemClock};
pub use scheduler::{ManualScheduler, Scheduler, TimerCallback, TimerHandle, TokioScheduler};
pub use supervisor::{ScheduledDeadline, TimeoutHandler, TimerSupervisor};
