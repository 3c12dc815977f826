//! Supervised scope for detached background work
//!
//! Jobs launched here outlive the operation that started them, but not the
//! scope: they live in a `JoinSet` owned by the scope, and shutting the scope
//! down drains them (then aborts stragglers) instead of leaking them.

use super::metrics;
use crate::Result;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinSet;

/// Default event broadcast capacity
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default time to wait for in-flight jobs on shutdown
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Events emitted by the scope
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A job began running
    JobStarted { label: String },

    /// A job finished successfully
    JobSucceeded { label: String, elapsed: Duration },

    /// A job returned an error; nothing else will see it
    JobFailed { label: String, message: String },

    /// The scope stopped accepting jobs
    ShutdownStarted,
}

/// Counters for jobs run on the scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStats {
    pub launched: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Jobs cut off by shutdown
    pub aborted: u64,
    pub in_flight: usize,
    pub last_success_at: Option<DateTime<Utc>>,
}

/// Shared between the scope handle and its running jobs
#[derive(Clone)]
struct JobContext {
    events: broadcast::Sender<SyncEvent>,
    stats: Arc<Mutex<SyncStats>>,
    in_flight: Arc<watch::Sender<usize>>,
}

impl JobContext {
    fn stats(&self) -> MutexGuard<'_, SyncStats> {
        // Counters stay usable even if a holder panicked
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn send_event(&self, event: SyncEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("Sync event sent but no receivers subscribed");
        }
    }

    fn job_finished(&self) {
        let mut remaining = 0;
        self.in_flight.send_modify(|n| {
            *n = n.saturating_sub(1);
            remaining = *n;
        });
        self.stats().in_flight = remaining;
        metrics::set_in_flight(remaining);
    }

    async fn run<F>(self, label: String, job: F)
    where
        F: Future<Output = Result<()>>,
    {
        self.send_event(SyncEvent::JobStarted {
            label: label.clone(),
        });
        let start = Instant::now();

        // A panicking job still has to be counted and reported
        let outcome = match AssertUnwindSafe(job).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(crate::TaskSyncError::Other(format!(
                "job panicked: {}",
                panic_message(payload.as_ref())
            ))),
        };
        let elapsed = start.elapsed();

        // Counters are updated before the event goes out so subscribers
        // always read totals that include this job
        let event = match outcome {
            Ok(()) => {
                {
                    let mut stats = self.stats();
                    stats.succeeded += 1;
                    stats.last_success_at = Some(Utc::now());
                }
                metrics::record_job(&label, "success", elapsed.as_secs_f64());
                tracing::debug!(job = %label, elapsed_ms = elapsed.as_millis() as u64, "Background job finished");
                SyncEvent::JobSucceeded { label, elapsed }
            }
            Err(e) => {
                self.stats().failed += 1;
                metrics::record_job(&label, "failure", elapsed.as_secs_f64());
                tracing::warn!(job = %label, error = %e, "Background job failed");
                SyncEvent::JobFailed {
                    label,
                    message: e.to_string(),
                }
            }
        };

        self.job_finished();
        self.send_event(event);
    }
}

/// Long-lived scope for fire-and-forget jobs
///
/// Cloning yields another handle to the same scope. Dropping the last handle
/// without [`SyncScope::shutdown`] aborts whatever is still running.
#[derive(Clone)]
pub struct SyncScope {
    jobs: Arc<Mutex<Option<JoinSet<()>>>>,
    ctx: JobContext,
    handle: Handle,
}

impl std::fmt::Debug for SyncScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncScope")
            .field("stats", &self.stats())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl SyncScope {
    /// Create a scope whose jobs run on the runtime behind `handle`
    pub fn new(handle: Handle, event_channel_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_channel_capacity.max(1));
        let (in_flight, _) = watch::channel(0);

        Self {
            jobs: Arc::new(Mutex::new(Some(JoinSet::new()))),
            ctx: JobContext {
                events,
                stats: Arc::new(Mutex::new(SyncStats::default())),
                in_flight: Arc::new(in_flight),
            },
            handle,
        }
    }

    /// Create a scope on the ambient runtime with default capacity
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current(), DEFAULT_EVENT_CHANNEL_CAPACITY)
    }

    fn jobs(&self) -> MutexGuard<'_, Option<JoinSet<()>>> {
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get an event subscriber
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.ctx.events.subscribe()
    }

    /// Snapshot of the job counters
    pub fn stats(&self) -> SyncStats {
        self.ctx.stats().clone()
    }

    /// Whether the scope has been shut down
    pub fn is_closed(&self) -> bool {
        self.jobs().is_none()
    }

    /// Start `job` in the background and return immediately
    ///
    /// Returns `false` (and drops the job) once the scope is shut down.
    /// Errors from the job are logged, counted and broadcast, never returned.
    pub fn launch<F>(&self, label: impl Into<String>, job: F) -> bool
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let label = label.into();
        let mut guard = self.jobs();
        let Some(set) = guard.as_mut() else {
            tracing::warn!(job = %label, "Sync scope is shut down, dropping job");
            return false;
        };

        // Reap jobs that already finished so the set does not grow unbounded
        while let Some(result) = set.try_join_next() {
            log_join_error(result);
        }

        let mut in_flight = 0;
        self.ctx.in_flight.send_modify(|n| {
            *n += 1;
            in_flight = *n;
        });
        {
            let mut stats = self.ctx.stats();
            stats.launched += 1;
            stats.in_flight = in_flight;
        }
        metrics::set_in_flight(in_flight);

        tracing::debug!(job = %label, in_flight, "Launching background job");
        set.spawn_on(self.ctx.clone().run(label, job), &self.handle);
        true
    }

    /// Wait until no job is running, or `timeout` elapses
    ///
    /// Returns `true` if the scope went idle in time. The scope stays open.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let mut rx = self.ctx.in_flight.subscribe();
        tokio::time::timeout(timeout, async move {
            loop {
                if *rx.borrow_and_update() == 0 {
                    break;
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .is_ok()
    }

    /// Stop accepting jobs, wait up to `grace` for running ones, abort the rest
    pub async fn shutdown(&self, grace: Duration) -> SyncStats {
        let taken = self.jobs().take();
        let Some(mut set) = taken else {
            return self.stats();
        };

        tracing::info!(in_flight = set.len(), "Shutting down sync scope");
        self.ctx.send_event(SyncEvent::ShutdownStarted);

        let drained = tokio::time::timeout(grace, async {
            while let Some(result) = set.join_next().await {
                log_join_error(result);
            }
        })
        .await
        .is_ok();

        if !drained {
            let remaining = set.len();
            tracing::warn!(remaining, "Sync scope grace period elapsed, aborting jobs");
            set.abort_all();
            while set.join_next().await.is_some() {}

            {
                let mut stats = self.ctx.stats();
                stats.aborted += remaining as u64;
                stats.in_flight = 0;
            }
            self.ctx.in_flight.send_replace(0);
            metrics::set_in_flight(0);
        }

        self.stats()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

fn log_join_error(result: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            tracing::error!(error = %e, "Background job panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskSyncError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn next_finished(rx: &mut broadcast::Receiver<SyncEvent>) -> SyncEvent {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("no event in time")
                .expect("event channel closed");
            if !matches!(event, SyncEvent::JobStarted { .. }) {
                return event;
            }
        }
    }

    #[tokio::test]
    async fn test_launch_runs_job() {
        let scope = SyncScope::current();
        let mut events = scope.subscribe();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        assert!(scope.launch("count", async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        assert!(matches!(
            next_finished(&mut events).await,
            SyncEvent::JobSucceeded { label, .. } if label == "count"
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let stats = scope.stats();
        assert_eq!(stats.launched, 1);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.in_flight, 0);
        assert!(stats.last_success_at.is_some());
    }

    #[tokio::test]
    async fn test_failure_is_swallowed_and_reported() {
        let scope = SyncScope::current();
        let mut events = scope.subscribe();

        scope.launch("broken", async {
            Err(TaskSyncError::Other("remote said no".to_string()))
        });

        match next_finished(&mut events).await {
            SyncEvent::JobFailed { label, message } => {
                assert_eq!(label, "broken");
                assert!(message.contains("remote said no"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(scope.stats().failed, 1);
    }

    #[tokio::test]
    async fn test_panicking_job_is_accounted_for() {
        let scope = SyncScope::current();
        let mut events = scope.subscribe();

        let explode = || -> Result<()> { panic!("push exploded") };
        scope.launch("boom", async move { explode() });

        assert!(scope.wait_idle(Duration::from_secs(5)).await);
        match next_finished(&mut events).await {
            SyncEvent::JobFailed { label, message } => {
                assert_eq!(label, "boom");
                assert!(message.contains("push exploded"));
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let stats = scope.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_wait_idle() {
        let scope = SyncScope::current();
        scope.launch("sleepy", async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        });

        assert!(scope.wait_idle(Duration::from_secs(5)).await);
        assert_eq!(scope.stats().succeeded, 1);
    }

    #[tokio::test]
    async fn test_wait_idle_times_out() {
        let scope = SyncScope::current();
        scope.launch("stuck", async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        });

        assert!(!scope.wait_idle(Duration::from_millis(20)).await);
        scope.shutdown(Duration::ZERO).await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_jobs() {
        let scope = SyncScope::current();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let d = Arc::clone(&done);
            scope.launch("drain", async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                d.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        let stats = scope.shutdown(Duration::from_secs(5)).await;
        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert_eq!(stats.succeeded, 3);
        assert_eq!(stats.aborted, 0);
        assert!(scope.is_closed());
    }

    #[tokio::test]
    async fn test_shutdown_aborts_after_grace() {
        let scope = SyncScope::current();
        scope.launch("forever", async {
            std::future::pending::<()>().await;
            Ok(())
        });

        let stats = scope.shutdown(Duration::from_millis(20)).await;
        assert_eq!(stats.aborted, 1);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_launch_after_shutdown_is_rejected() {
        let scope = SyncScope::current();
        scope.shutdown(DEFAULT_SHUTDOWN_GRACE).await;

        assert!(!scope.launch("late", async { Ok(()) }));
        assert_eq!(scope.stats().launched, 0);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let scope = SyncScope::current();
        let other = scope.clone();

        other.launch("shared", async { Ok(()) });
        assert!(scope.wait_idle(Duration::from_secs(5)).await);
        assert_eq!(scope.stats().launched, 1);
    }
}
