//! Scheduler - runs periodic background jobs until shutdown.
//!
//! Each job gets its own task and its own interval, so a slow or failing
//! job never delays another. Ticks missed while a run is in progress are
//! skipped rather than queued.
//!
//! ## Graceful Shutdown
//!
//! [`SchedulerHandle::shutdown`] signals every job loop through a watch
//! channel and waits for the in-flight runs to finish.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::domain::foundation::DomainError;

/// What a single job run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run finished; the number is the job's item count.
    Completed(usize),

    /// Another run of the same job was still in progress.
    Skipped,
}

/// A job the scheduler invokes on a fixed period.
#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Perform one run. Errors are logged by the scheduler and the next
    /// tick runs as usual.
    async fn run(&self) -> Result<RunOutcome, DomainError>;
}

/// Rejects a run while another run of the same job is in progress.
#[derive(Debug, Default)]
pub struct RunGuard {
    running: AtomicBool,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a permit, or `None` if a run is already in progress.
    pub fn try_acquire(&self) -> Option<RunPermit<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit { guard: self })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Held for the duration of a run.
#[derive(Debug)]
pub struct RunPermit<'a> {
    guard: &'a RunGuard,
}

impl Drop for RunPermit<'_> {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}

/// Collects jobs and their periods before starting.
#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<(Arc<dyn PeriodicJob>, Duration)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `job` to run every `period`, starting immediately.
    pub fn with_job(mut self, job: Arc<dyn PeriodicJob>, period: Duration) -> Self {
        self.jobs.push((job, period));
        self
    }

    /// Spawn one task per job.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let tasks = self
            .jobs
            .into_iter()
            .map(|(job, period)| {
                tracing::info!(job = job.name(), period_secs = period.as_secs(), "Starting job");
                tokio::spawn(run_job(job, period, shutdown_rx.clone()))
            })
            .collect();

        SchedulerHandle {
            shutdown: shutdown_tx,
            tasks,
        }
    }
}

/// Handle to running jobs.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn job_count(&self) -> usize {
        self.tasks.len()
    }

    /// Stop every job and wait for in-flight runs to complete.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Job task ended abnormally");
            }
        }
        tracing::info!("Scheduler stopped");
    }
}

async fn run_job(job: Arc<dyn PeriodicJob>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::debug!(job = job.name(), "Job stopping");
                    return;
                }
            }

            _ = interval.tick() => {
                // A panicking run must not end the loop.
                if let Err(e) = tokio::spawn(run_once(job.clone())).await {
                    tracing::error!(job = job.name(), error = %e, "Job run panicked");
                }
            }
        }
    }
}

async fn run_once(job: Arc<dyn PeriodicJob>) {
    match job.run().await {
        Ok(RunOutcome::Completed(count)) => {
            tracing::debug!(job = job.name(), count, "Job run completed");
        }
        Ok(RunOutcome::Skipped) => {
            tracing::debug!(job = job.name(), "Job run skipped, previous run in progress");
        }
        Err(e) => {
            tracing::error!(job = job.name(), error = %e, "Job run failed");
        }
    }
}
