use std::time::Duration;

use async_trait::async_trait;

use fruitsupply_core::TaskId;

use super::types::{TaskMessage, TaskStatus};

/// Default lifetime of result-backend entries (one day).
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Task queue / result backend failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueueError {
    #[error("broker error: {0}")]
    Broker(String),
    #[error("task encoding failed: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for QueueError {
    fn from(value: serde_json::Error) -> Self {
        QueueError::Serialize(value.to_string())
    }
}

/// Broker plus result backend.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Enqueue a message and return its handle.
    async fn enqueue(&self, message: TaskMessage) -> Result<TaskId, QueueError>;

    /// Take the oldest message, waiting up to `wait` for one to arrive.
    async fn next(&self, wait: Duration) -> Result<Option<TaskMessage>, QueueError>;

    /// Record a task's state in the result backend.
    async fn record(&self, status: TaskStatus) -> Result<(), QueueError>;

    /// Read a task's state; unknown ids are `Pending`.
    async fn status(&self, task_id: TaskId) -> Result<TaskStatus, QueueError>;
}
