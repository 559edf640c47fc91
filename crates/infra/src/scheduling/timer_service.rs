//! Timer service backed by `tokio-cron-scheduler`.
//!
//! Jobs are registered under a string key. Registering the same key again
//! replaces the pending job, which keeps alarm recomputation idempotent.
//! The service has an explicit lifecycle (`start`/`shutdown`) owned by the
//! composition root; jobs may be registered before it starts and fire once
//! it runs. Every job execution is wrapped in a timeout and observes a
//! cancellation token that `shutdown` trips.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use liftoff_core::{JobHandler, ScheduledJob, TimerService};
//! use liftoff_domain::JobKind;
//! use liftoff_infra::scheduling::{CronTimerService, SchedulerResult};
//!
//! struct NoopJob;
//!
//! #[async_trait]
//! impl JobHandler for NoopJob {
//!     async fn run(&self) -> liftoff_domain::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> SchedulerResult<()> {
//! let timer = CronTimerService::new().await?;
//! timer.start().await?;
//! let job = ScheduledJob::recurring("heartbeat", JobKind::RecurringAlarm, Duration::from_secs(60), Arc::new(NoopJob));
//! timer.register(job).await.ok();
//! // ... application runs ...
//! timer.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use liftoff_core::{JobHandler, ScheduledJob, TimerService};
use liftoff_domain::{JobKind, Result, Trigger};
use parking_lot::{Mutex, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::error::{SchedulerError, SchedulerResult};

/// Timeouts applied by the timer service.
#[derive(Debug, Clone)]
pub struct TimerServiceConfig {
    /// Timeout applied to a single job execution.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for shutting the scheduler down.
    pub stop_timeout: Duration,
}

impl Default for TimerServiceConfig {
    fn default() -> Self {
        Self {
            job_timeout: Duration::from_secs(300),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Registration {
    id: Uuid,
    kind: JobKind,
}

type Registry = Arc<Mutex<HashMap<String, Registration>>>;

/// Keyed timer registrations on top of a [`JobScheduler`].
pub struct CronTimerService {
    scheduler: Arc<tokio::sync::RwLock<JobScheduler>>,
    registry: Registry,
    config: TimerServiceConfig,
    running: AtomicBool,
    cancellation: Arc<RwLock<CancellationToken>>,
}

impl CronTimerService {
    /// Create a service with the default configuration.
    pub async fn new() -> SchedulerResult<Self> {
        Self::with_config(TimerServiceConfig::default()).await
    }

    /// Create a service with a custom configuration.
    pub async fn with_config(config: TimerServiceConfig) -> SchedulerResult<Self> {
        let scheduler =
            JobScheduler::new().await.map_err(|source| SchedulerError::CreationFailed { source })?;

        Ok(Self {
            scheduler: Arc::new(tokio::sync::RwLock::new(scheduler)),
            registry: Arc::new(Mutex::new(HashMap::new())),
            config,
            running: AtomicBool::new(false),
            cancellation: Arc::new(RwLock::new(CancellationToken::new())),
        })
    }

    /// Start firing registered jobs.
    #[instrument(skip(self))]
    pub async fn start(&self) -> SchedulerResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyRunning);
        }

        *self.cancellation.write() = CancellationToken::new();

        let start_timeout = self.config.start_timeout;
        let started = tokio::time::timeout(start_timeout, async {
            let guard = self.scheduler.read().await;
            guard.start().await
        })
        .await;

        let result = match started {
            Ok(inner) => inner.map_err(|source| SchedulerError::StartFailed { source }),
            Err(source) => Err(SchedulerError::Timeout { duration: start_timeout, source }),
        };
        if result.is_err() {
            self.running.store(false, Ordering::SeqCst);
        }
        result?;

        info!(registered = self.registry.lock().len(), "timer.started");
        Ok(())
    }

    /// Cancel in-flight jobs and stop the scheduler.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> SchedulerResult<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.read().cancel();

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, async {
            let mut guard = self.scheduler.write().await;
            guard.shutdown().await
        })
        .await
        .map_err(|source| SchedulerError::Timeout { duration: stop_timeout, source })?
        .map_err(|source| SchedulerError::StopFailed { source })?;

        info!("timer.stopped");
        Ok(())
    }

    /// Returns true between `start` and `shutdown`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of pending registrations of `kind`.
    pub fn count_kind(&self, kind: JobKind) -> usize {
        self.registry.lock().values().filter(|registration| registration.kind == kind).count()
    }

    fn build_job(&self, job: &ScheduledJob) -> SchedulerResult<Job> {
        let runner = JobRunner {
            key: job.key.clone(),
            handler: Arc::clone(&job.handler),
            registry: Arc::clone(&self.registry),
            cancellation: Arc::clone(&self.cancellation),
            timeout: self.config.job_timeout,
            one_shot: matches!(job.trigger, Trigger::At(_)),
        };

        let built = match job.trigger {
            Trigger::Every(period) => {
                Job::new_repeated_async(period, move |id, _lock| runner.clone().fire_boxed(id))
            }
            Trigger::At(_) => {
                let delay = job.trigger.initial_delay(Utc::now());
                Job::new_one_shot_async(delay, move |id, _lock| runner.clone().fire_boxed(id))
            }
        };
        built.map_err(|source| SchedulerError::JobRegistrationFailed { key: job.key.clone(), source })
    }

    /// Registrations are serialized on the scheduler write lock. The
    /// previous job for the key is removed before the new one is added, so
    /// a failed removal leaves the old registration tracked and cancellable.
    async fn register_job(&self, job: ScheduledJob) -> SchedulerResult<()> {
        let definition = self.build_job(&job)?;
        let guard = self.scheduler.write().await;

        let previous = self.registry.lock().get(&job.key).map(|registration| registration.id);
        if let Some(previous) = previous {
            guard.remove(&previous).await.map_err(|source| SchedulerError::JobRemovalFailed {
                key: job.key.clone(),
                source,
            })?;
            self.registry.lock().remove(&job.key);
            debug!(key = %job.key, "timer.job_replaced");
        }

        let id = guard.add(definition).await.map_err(|source| {
            SchedulerError::JobRegistrationFailed { key: job.key.clone(), source }
        })?;
        self.registry.lock().insert(job.key.clone(), Registration { id, kind: job.kind });

        debug!(key = %job.key, kind = %job.kind, trigger = ?job.trigger, job_id = %id, "timer.job_registered");
        Ok(())
    }
}

/// State captured by every firing of one registration.
#[derive(Clone)]
struct JobRunner {
    key: String,
    handler: Arc<dyn JobHandler>,
    registry: Registry,
    cancellation: Arc<RwLock<CancellationToken>>,
    timeout: Duration,
    one_shot: bool,
}

impl JobRunner {
    fn fire_boxed(self, id: Uuid) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(self.fire(id))
    }

    async fn fire(self, id: Uuid) {
        let cancel = self.cancellation.read().clone();
        let started = Instant::now();

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(key = %self.key, "timer.job_cancelled");
            }
            outcome = tokio::time::timeout(self.timeout, self.handler.run()) => match outcome {
                Ok(Ok(())) => {
                    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                    debug!(key = %self.key, elapsed_ms, "timer.job_completed");
                }
                Ok(Err(err)) => {
                    error!(key = %self.key, error = %err, "timer.job_failed");
                }
                Err(_) => {
                    warn!(key = %self.key, timeout_secs = self.timeout.as_secs(), "timer.job_timed_out");
                }
            }
        }

        if self.one_shot {
            let mut registry = self.registry.lock();
            if registry.get(&self.key).is_some_and(|registration| registration.id == id) {
                registry.remove(&self.key);
            }
        }
    }
}

#[async_trait]
impl TimerService for CronTimerService {
    async fn register(&self, job: ScheduledJob) -> Result<()> {
        Ok(self.register_job(job).await?)
    }

    async fn cancel(&self, key: &str) -> Result<bool> {
        let guard = self.scheduler.write().await;
        let registered = self.registry.lock().get(key).map(|registration| registration.id);
        match registered {
            Some(id) => {
                guard.remove(&id).await.map_err(|source| SchedulerError::JobRemovalFailed {
                    key: key.to_string(),
                    source,
                })?;
                self.registry.lock().remove(key);
                debug!(key, "timer.job_cancelled_by_key");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pending(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.registry.lock().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl Drop for CronTimerService {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("timer.dropped_while_running");
            self.cancellation.read().cancel();
        }
    }
}
