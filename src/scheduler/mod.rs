//! Named periodic task scheduler
//!
//! Owns at most one running task per name. Registering a name that is already
//! running cancels the old task and starts over from zero.

mod task;

pub use task::Scheduler;

use futures_util::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Periodic tasks known to the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskName {
    /// Quote refresh loop
    Refresh,
    /// Sample recording loop
    Record,
}

impl TaskName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskName::Refresh => "refresh",
            TaskName::Record => "record",
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work run on every tick
pub type Job = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;
