//! Cron-based task scheduler for recurring tasks
//!
//! Runs the weather report batch on a schedule when it is enabled.
//! Uses `tokio-cron-scheduler` for cron-based scheduling; expressions have
//! six fields (sec min hour day month weekday) and are validated with `cron`.

use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, error, info, instrument, warn};

/// Scheduler errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Invalid cron expression
    #[error("Invalid cron expression: {0}")]
    InvalidCronExpression(String),

    /// Task not found
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// A task with this name is already registered
    #[error("Task already registered: {0}")]
    DuplicateTask(String),

    /// The task is still executing a previous run
    #[error("Task is already running: {0}")]
    AlreadyRunning(String),

    /// Task execution failed
    #[error("Task execution failed: {0}")]
    ExecutionFailed(String),

    /// Internal scheduler error
    #[error("Internal scheduler error: {0}")]
    Internal(String),
}

impl From<JobSchedulerError> for SchedulerError {
    fn from(err: JobSchedulerError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Task status for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Registered, never run
    Scheduled,
    /// Currently executing
    Running,
    /// Last run succeeded
    Completed,
    /// Last run failed
    Failed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Statistics for a scheduled task
#[derive(Debug, Clone)]
pub struct TaskStats {
    /// Task name
    pub name: String,
    /// Cron expression
    pub cron_expression: String,
    /// Current status
    pub status: TaskStatus,
    /// Number of successful executions
    pub success_count: u64,
    /// Number of failed executions
    pub failure_count: u64,
    /// Runs skipped because the previous run was still going
    pub skipped_count: u64,
    /// Last execution time
    pub last_run: Option<DateTime<Utc>>,
    /// Last error message
    pub last_error: Option<String>,
    /// Next scheduled run
    pub next_run: Option<DateTime<Utc>>,
}

type TaskFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// A registered task and its run bookkeeping
struct TaskEntry {
    name: String,
    cron_expression: String,
    schedule: cron::Schedule,
    task: TaskFn,
    running: AtomicBool,
    success_count: AtomicU64,
    failure_count: AtomicU64,
    skipped_count: AtomicU64,
    last_run: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<String>>,
    last_succeeded: RwLock<Option<bool>>,
}

impl TaskEntry {
    fn new(name: &str, cron_expression: &str, schedule: cron::Schedule, task: TaskFn) -> Self {
        Self {
            name: name.to_string(),
            cron_expression: cron_expression.to_string(),
            schedule,
            task,
            running: AtomicBool::new(false),
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            skipped_count: AtomicU64::new(0),
            last_run: RwLock::new(None),
            last_error: RwLock::new(None),
            last_succeeded: RwLock::new(None),
        }
    }

    /// Run the task once; `None` if a previous run is still in progress
    async fn execute(&self) -> Option<Result<(), String>> {
        if self.running.swap(true, Ordering::AcqRel) {
            self.skipped_count.fetch_add(1, Ordering::Relaxed);
            warn!(task = %self.name, "Previous run still in progress, skipping");
            return None;
        }

        debug!(task = %self.name, "Starting scheduled task");
        let start = std::time::Instant::now();
        let result = (self.task)().await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        *self.last_run.write() = Some(Utc::now());
        match &result {
            Ok(()) => {
                self.success_count.fetch_add(1, Ordering::Relaxed);
                *self.last_succeeded.write() = Some(true);
                info!(task = %self.name, duration_ms, "Task completed successfully");
            },
            Err(e) => {
                self.failure_count.fetch_add(1, Ordering::Relaxed);
                *self.last_succeeded.write() = Some(false);
                *self.last_error.write() = Some(e.clone());
                error!(task = %self.name, error = %e, duration_ms, "Task failed");
            },
        }

        self.running.store(false, Ordering::Release);
        Some(result)
    }

    fn to_stats(&self) -> TaskStats {
        let status = if self.running.load(Ordering::Acquire) {
            TaskStatus::Running
        } else {
            match *self.last_succeeded.read() {
                None => TaskStatus::Scheduled,
                Some(true) => TaskStatus::Completed,
                Some(false) => TaskStatus::Failed,
            }
        };

        TaskStats {
            name: self.name.clone(),
            cron_expression: self.cron_expression.clone(),
            status,
            success_count: self.success_count.load(Ordering::Relaxed),
            failure_count: self.failure_count.load(Ordering::Relaxed),
            skipped_count: self.skipped_count.load(Ordering::Relaxed),
            last_run: *self.last_run.read(),
            last_error: self.last_error.read().clone(),
            next_run: self.schedule.upcoming(Utc).next(),
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Whether to start the scheduler immediately
    pub auto_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { auto_start: true }
    }
}

/// Task scheduler for recurring background tasks
pub struct TaskScheduler {
    scheduler: AsyncMutex<JobScheduler>,
    tasks: RwLock<HashMap<String, Arc<TaskEntry>>>,
    running: AtomicBool,
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("task_count", &self.tasks.read().len())
            .finish_non_exhaustive()
    }
}

impl TaskScheduler {
    /// Create a new task scheduler
    #[instrument(skip_all)]
    pub async fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        let instance = Self {
            scheduler: AsyncMutex::new(JobScheduler::new().await?),
            tasks: RwLock::new(HashMap::new()),
            running: AtomicBool::new(false),
        };

        if config.auto_start {
            instance.start().await?;
        }

        info!("Task scheduler initialized");
        Ok(instance)
    }

    /// Start the scheduler
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<(), SchedulerError> {
        if self.running.load(Ordering::Relaxed) {
            debug!("Scheduler already running");
            return Ok(());
        }

        self.scheduler.lock().await.start().await?;
        self.running.store(true, Ordering::Relaxed);
        info!("Task scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// A stopped scheduler cannot be restarted; create a new one instead.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        if !self.running.load(Ordering::Relaxed) {
            debug!("Scheduler already stopped");
            return Ok(());
        }

        self.scheduler.lock().await.shutdown().await?;
        self.running.store(false, Ordering::Relaxed);
        info!("Task scheduler stopped");
        Ok(())
    }

    /// Check if the scheduler is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Add a scheduled task
    ///
    /// A tick that arrives while the previous run is still executing is
    /// skipped rather than queued.
    #[instrument(skip(self, task))]
    pub async fn add_task<F, Fut>(
        &self,
        name: &str,
        cron_expression: &str,
        task: F,
    ) -> Result<(), SchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        let schedule = cron_expression.parse::<cron::Schedule>().map_err(|e| {
            SchedulerError::InvalidCronExpression(format!("{cron_expression}: {e}"))
        })?;

        if self.tasks.read().contains_key(name) {
            return Err(SchedulerError::DuplicateTask(name.to_string()));
        }

        let task: TaskFn =
            Arc::new(move || -> BoxFuture<'static, Result<(), String>> { Box::pin(task()) });
        let entry = Arc::new(TaskEntry::new(name, cron_expression, schedule, task));

        let job_entry = Arc::clone(&entry);
        let job = Job::new_async(cron_expression, move |_uuid, _lock| {
            let entry = Arc::clone(&job_entry);
            Box::pin(async move {
                entry.execute().await;
            })
        })
        .map_err(|e| SchedulerError::InvalidCronExpression(e.to_string()))?;

        self.scheduler.lock().await.add(job).await?;
        self.tasks.write().insert(name.to_string(), entry);

        info!(task = %name, cron = %cron_expression, "Task scheduled");
        Ok(())
    }

    /// Execute a registered task immediately, outside its schedule
    #[instrument(skip(self))]
    pub async fn run_now(&self, name: &str) -> Result<(), SchedulerError> {
        let entry = self
            .tasks
            .read()
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| SchedulerError::TaskNotFound(name.to_string()))?;

        match entry.execute().await {
            Some(Ok(())) => Ok(()),
            Some(Err(e)) => Err(SchedulerError::ExecutionFailed(e)),
            None => Err(SchedulerError::AlreadyRunning(name.to_string())),
        }
    }

    /// Get statistics for a specific task
    #[must_use]
    pub fn get_task_stats(&self, name: &str) -> Option<TaskStats> {
        self.tasks.read().get(name).map(|entry| entry.to_stats())
    }
}
