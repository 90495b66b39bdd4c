//! Task message and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use fruitsupply_core::TaskId;

use crate::document_store::StoreError;

/// A task as it travels through the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMessage {
    pub id: TaskId,
    /// Registered task name, e.g. `inventory.reset_quantity`.
    pub name: String,
    /// Positional arguments.
    pub args: Vec<JsonValue>,
    pub enqueued_at: DateTime<Utc>,
}

impl TaskMessage {
    pub fn new(name: impl Into<String>, args: Vec<JsonValue>) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            args,
            enqueued_at: Utc::now(),
        }
    }
}

/// Lifecycle state kept in the result backend.
///
/// Unknown ids read as `Pending`, so a client cannot tell "queued" from
/// "never issued".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Started,
    Success { result: JsonValue },
    Failure { error: String },
}

impl TaskState {
    pub fn is_ready(&self) -> bool {
        matches!(self, TaskState::Success { .. } | TaskState::Failure { .. })
    }
}

/// Result-backend entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task_id: TaskId,
    #[serde(flatten)]
    pub state: TaskState,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskStatus {
    pub fn new(task_id: TaskId, state: TaskState) -> Self {
        Self {
            task_id,
            state,
            updated_at: Some(Utc::now()),
        }
    }

    pub fn pending(task_id: TaskId) -> Self {
        Self {
            task_id,
            state: TaskState::Pending,
            updated_at: None,
        }
    }
}

/// Why a task run failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaskError {
    #[error("no task registered under {0:?}")]
    UnknownTask(String),
    #[error("invalid task arguments: {0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
