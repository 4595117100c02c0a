//! Scheduler implementation

use super::{Job, TaskName};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Runs named jobs on fixed periods, firing once immediately on registration
#[derive(Default)]
pub struct Scheduler {
    tasks: Mutex<HashMap<TaskName, JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn tasks(&self) -> MutexGuard<'_, HashMap<TaskName, JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start `job` under `name`, replacing any task already registered.
    ///
    /// Returns true if a running task was replaced.
    pub fn register(&self, name: TaskName, period: Duration, job: Job) -> bool {
        let handle = tokio::spawn(run_periodic(name, Instant::now(), period, job));
        let replaced = self.tasks().insert(name, handle);

        match replaced {
            Some(old) => {
                old.abort();
                tracing::debug!(task = %name, period_secs = period.as_secs_f64(), "Rescheduled task");
                true
            }
            None => {
                tracing::debug!(task = %name, period_secs = period.as_secs_f64(), "Scheduled task");
                false
            }
        }
    }

    /// Like `register`, but the first tick comes one period from now.
    ///
    /// Used when the caller has just run the job inline.
    pub fn register_deferred(&self, name: TaskName, period: Duration, job: Job) -> bool {
        let start = Instant::now() + period;
        let handle = tokio::spawn(run_periodic(name, start, period, job));
        let replaced = self.tasks().insert(name, handle);
        if let Some(old) = &replaced {
            old.abort();
        }
        tracing::debug!(task = %name, period_secs = period.as_secs_f64(), "Scheduled deferred task");
        replaced.is_some()
    }

    /// Stop the task registered under `name`. Returns true if one was running.
    pub fn cancel(&self, name: TaskName) -> bool {
        match self.tasks().remove(&name) {
            Some(handle) => {
                let was_running = !handle.is_finished();
                handle.abort();
                tracing::debug!(task = %name, "Cancelled task");
                was_running
            }
            None => false,
        }
    }

    pub fn is_active(&self, name: TaskName) -> bool {
        self.tasks().get(&name).is_some_and(|h| !h.is_finished())
    }

    /// Stop every task
    pub fn shutdown(&self) {
        for (name, handle) in self.tasks().drain() {
            handle.abort();
            tracing::debug!(task = %name, "Stopped task");
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_periodic(name: TaskName, start: Instant, period: Duration, job: Job) {
    let mut ticker = interval_at(start, period.max(Duration::from_millis(1)));
    // A slow tick pushes the following ones back instead of bursting
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        tracing::trace!(task = %name, "Task tick");
        job().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_job(count: Arc<AtomicUsize>) -> Job {
        Arc::new(move || {
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        })
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_immediately_then_every_period() {
        let scheduler = Scheduler::new();
        let count = Arc::new(AtomicUsize::new(0));

        scheduler.register(TaskName::Record, Duration::from_secs(60), counting_job(count.clone()));
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(59)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(scheduler.is_active(TaskName::Record));
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_restarts_from_zero() {
        let scheduler = Scheduler::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        assert!(!scheduler.register(TaskName::Refresh, Duration::from_secs(20), counting_job(first.clone())));
        settle().await;
        tokio::time::advance(Duration::from_secs(15)).await;
        settle().await;

        assert!(scheduler.register(TaskName::Refresh, Duration::from_secs(20), counting_job(second.clone())));
        settle().await;
        assert_eq!(second.load(Ordering::SeqCst), 1);

        // The old schedule would have fired at t=20
        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_waits_one_period() {
        let scheduler = Scheduler::new();
        let count = Arc::new(AtomicUsize::new(0));

        assert!(!scheduler.register_deferred(TaskName::Refresh, Duration::from_secs(20), counting_job(count.clone())));
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(scheduler.is_active(TaskName::Refresh));

        tokio::time::advance(Duration::from_secs(20)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(20)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_task() {
        let scheduler = Scheduler::new();
        let count = Arc::new(AtomicUsize::new(0));

        scheduler.register(TaskName::Record, Duration::from_secs(60), counting_job(count.clone()));
        settle().await;

        assert!(scheduler.cancel(TaskName::Record));
        assert!(!scheduler.cancel(TaskName::Record));
        assert!(!scheduler.is_active(TaskName::Record));

        tokio::time::advance(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_all() {
        let scheduler = Scheduler::new();
        let count = Arc::new(AtomicUsize::new(0));

        scheduler.register(TaskName::Refresh, Duration::from_secs(20), counting_job(count.clone()));
        scheduler.register(TaskName::Record, Duration::from_secs(60), counting_job(count.clone()));
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        scheduler.shutdown();
        assert!(!scheduler.is_active(TaskName::Refresh));
        assert!(!scheduler.is_active(TaskName::Record));

        tokio::time::advance(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_task_name_display() {
        assert_eq!(TaskName::Refresh.to_string(), "refresh");
        assert_eq!(TaskName::Record.to_string(), "record");
    }
}
