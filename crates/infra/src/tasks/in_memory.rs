//! In-memory broker and result backend for tests/dev.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;

use fruitsupply_core::TaskId;

use super::queue::{QueueError, TaskQueue, DEFAULT_RESULT_TTL};
use super::types::{TaskMessage, TaskStatus};

/// Process-local queue. Messages are lost on restart.
///
/// Result entries expire `result_ttl` after they were last written, same as
/// the Redis backend; expired entries are swept on each `record`.
#[derive(Debug)]
pub struct InMemoryTaskQueue {
    pending: Mutex<VecDeque<TaskMessage>>,
    results: Mutex<HashMap<TaskId, StoredResult>>,
    arrived: Notify,
    result_ttl: Duration,
}

#[derive(Debug)]
struct StoredResult {
    status: TaskStatus,
    expires_at: Instant,
}

impl Default for InMemoryTaskQueue {
    fn default() -> Self {
        Self {
            pending: Mutex::default(),
            results: Mutex::default(),
            arrived: Notify::new(),
            result_ttl: DEFAULT_RESULT_TTL,
        }
    }
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result_ttl(mut self, ttl: Duration) -> Self {
        self.result_ttl = ttl;
        self
    }

    /// Messages waiting to be consumed.
    pub fn len(&self) -> usize {
        self.pending.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn pop(&self) -> Result<Option<TaskMessage>, QueueError> {
        let mut pending = self.pending.lock().map_err(|_| poisoned())?;
        Ok(pending.pop_front())
    }
}

fn poisoned() -> QueueError {
    QueueError::Broker("in-memory queue lock poisoned".to_string())
}

#[async_trait]
impl TaskQueue for InMemoryTaskQueue {
    async fn enqueue(&self, message: TaskMessage) -> Result<TaskId, QueueError> {
        let id = message.id;
        self.pending.lock().map_err(|_| poisoned())?.push_back(message);
        self.arrived.notify_one();
        Ok(id)
    }

    async fn next(&self, wait: Duration) -> Result<Option<TaskMessage>, QueueError> {
        let deadline = Instant::now() + wait;
        loop {
            if let Some(message) = self.pop()? {
                return Ok(Some(message));
            }
            if tokio::time::timeout_at(deadline, self.arrived.notified()).await.is_err() {
                return self.pop();
            }
        }
    }

    async fn record(&self, status: TaskStatus) -> Result<(), QueueError> {
        let now = Instant::now();
        let mut results = self.results.lock().map_err(|_| poisoned())?;
        results.retain(|_, stored| stored.expires_at > now);
        results.insert(
            status.task_id,
            StoredResult {
                status,
                expires_at: now + self.result_ttl,
            },
        );
        Ok(())
    }

    async fn status(&self, task_id: TaskId) -> Result<TaskStatus, QueueError> {
        let now = Instant::now();
        let results = self.results.lock().map_err(|_| poisoned())?;
        Ok(results
            .get(&task_id)
            .filter(|stored| stored.expires_at > now)
            .map(|stored| stored.status.clone())
            .unwrap_or_else(|| TaskStatus::pending(task_id)))
    }
}
