//! Task worker: pulls messages off a `TaskQueue` and runs the handler
//! registered under the message's name.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use serde_json::Value as JsonValue;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::queue::TaskQueue;
use super::types::{TaskError, TaskMessage, TaskState, TaskStatus};

/// Task handler: positional arguments in, JSON result out.
pub type TaskHandler =
    Arc<dyn Fn(Vec<JsonValue>) -> BoxFuture<'static, Result<JsonValue, TaskError>> + Send + Sync>;

/// Task name -> handler.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    handlers: HashMap<String, TaskHandler>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(Vec<JsonValue>) -> BoxFuture<'static, Result<JsonValue, TaskError>>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<TaskHandler> {
        self.handlers.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How long one `next()` call may block waiting for a message.
    pub poll_interval: Duration,
    /// Name for logging.
    pub name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            name: "task-worker".to_string(),
        }
    }
}

impl WorkerConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Worker runtime statistics.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct WorkerStats {
    pub tasks_processed: u64,
    pub tasks_succeeded: u64,
    pub tasks_failed: u64,
    pub uptime_secs: u64,
}

/// Handle to control a running worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: watch::Sender<bool>,
    join: Option<JoinHandle<()>>,
    stats: Arc<Mutex<WorkerStats>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the in-flight task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(j) = self.join.take() {
            let _ = j.await;
        }
    }

    pub fn stats(&self) -> WorkerStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

/// Background task worker.
#[derive(Clone)]
pub struct Worker {
    queue: Arc<dyn TaskQueue>,
    registry: Arc<TaskRegistry>,
    config: WorkerConfig,
}

impl Worker {
    pub fn new(queue: Arc<dyn TaskQueue>, registry: TaskRegistry, config: WorkerConfig) -> Self {
        Self {
            queue,
            registry: Arc::new(registry),
            config,
        }
    }

    /// Run one message to completion and record its terminal state.
    ///
    /// Result-backend write failures are logged, never propagated: the task
    /// itself has already run.
    pub async fn execute(&self, message: TaskMessage) -> TaskStatus {
        let task_id = message.id;
        self.record(TaskStatus::new(task_id, TaskState::Started)).await;

        let outcome = match self.registry.get(&message.name) {
            Some(handler) => handler(message.args).await,
            None => Err(TaskError::UnknownTask(message.name.clone())),
        };

        let state = match outcome {
            Ok(result) => {
                debug!(worker = %self.config.name, task_id = %task_id, task = %message.name, "task succeeded");
                TaskState::Success { result }
            }
            Err(e) => {
                warn!(worker = %self.config.name, task_id = %task_id, task = %message.name, error = %e, "task failed");
                TaskState::Failure {
                    error: e.to_string(),
                }
            }
        };

        let status = TaskStatus::new(task_id, state);
        self.record(status.clone()).await;
        status
    }

    /// Take at most one message, waiting up to `poll_interval`, and execute it.
    async fn run_once(&self) -> Option<TaskStatus> {
        match self.queue.next(self.config.poll_interval).await {
            Ok(Some(message)) => Some(self.execute(message).await),
            Ok(None) => None,
            Err(e) => {
                error!(worker = %self.config.name, error = %e, "failed to take task");
                tokio::time::sleep(self.config.poll_interval).await;
                None
            }
        }
    }

    /// Spawn the worker loop on the current tokio runtime.
    pub fn spawn(self) -> WorkerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(Mutex::new(WorkerStats::default()));
        let join = tokio::spawn(worker_loop(self, shutdown_rx, stats.clone()));

        WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
            stats,
        }
    }

    async fn record(&self, status: TaskStatus) {
        if let Err(e) = self.queue.record(status).await {
            error!(worker = %self.config.name, error = %e, "failed to record task state");
        }
    }
}

async fn worker_loop(
    worker: Worker,
    shutdown_rx: watch::Receiver<bool>,
    stats: Arc<Mutex<WorkerStats>>,
) {
    info!(
        worker = %worker.config.name,
        tasks = ?worker.registry.names().collect::<Vec<_>>(),
        "task worker started"
    );
    let start_time = Instant::now();

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // The poll is never cancelled: a message popped by an abandoned BRPOP
        // would be lost. Shutdown waits for at most one `poll_interval`.
        let status = worker.run_once().await;

        if let Ok(mut s) = stats.lock() {
            s.uptime_secs = start_time.elapsed().as_secs();
            if let Some(status) = status {
                s.tasks_processed += 1;
                match status.state {
                    TaskState::Success { .. } => s.tasks_succeeded += 1,
                    _ => s.tasks_failed += 1,
                }
            }
        }
    }

    info!(worker = %worker.config.name, "task worker stopped");
}
