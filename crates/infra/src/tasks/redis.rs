//! Redis-backed broker and result backend.
//!
//! - broker: one list per queue name; producers `LPUSH`, consumers `BRPOP`
//! - results: one string key per task id holding the JSON `TaskStatus`,
//!   expiring after `result_ttl`
//!
//! Delivery is at-most-once: a message popped by a worker that then crashes
//! is gone.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::warn;

use fruitsupply_core::TaskId;

use super::queue::{QueueError, TaskQueue, DEFAULT_RESULT_TTL};
use super::types::{TaskMessage, TaskStatus};

impl From<redis::RedisError> for QueueError {
    fn from(value: redis::RedisError) -> Self {
        QueueError::Broker(value.to_string())
    }
}

#[derive(Clone)]
pub struct RedisTaskQueue {
    broker: ConnectionManager,
    // BRPOP parks its connection; keep it off the producer connection.
    consumer: ConnectionManager,
    results: ConnectionManager,
    keys: QueueKeys,
    result_ttl: Duration,
}

impl RedisTaskQueue {
    pub async fn connect(
        broker_url: &str,
        result_backend_url: &str,
        queue_name: &str,
    ) -> Result<Self, QueueError> {
        let broker_client = redis::Client::open(broker_url)?;
        let results_client = redis::Client::open(result_backend_url)?;

        Ok(Self {
            broker: ConnectionManager::new(broker_client.clone()).await?,
            consumer: ConnectionManager::new(broker_client).await?,
            results: ConnectionManager::new(results_client).await?,
            keys: QueueKeys::new(queue_name),
            result_ttl: DEFAULT_RESULT_TTL,
        })
    }

    pub fn with_result_ttl(mut self, ttl: Duration) -> Self {
        self.result_ttl = ttl;
        self
    }
}

#[async_trait]
impl TaskQueue for RedisTaskQueue {
    async fn enqueue(&self, message: TaskMessage) -> Result<TaskId, QueueError> {
        let payload = serde_json::to_string(&message)?;
        let mut conn = self.broker.clone();

        let _: i64 = redis::cmd("LPUSH")
            .arg(&self.keys.queue)
            .arg(payload)
            .query_async(&mut conn)
            .await?;

        Ok(message.id)
    }

    async fn next(&self, wait: Duration) -> Result<Option<TaskMessage>, QueueError> {
        let mut conn = self.consumer.clone();
        let timeout_secs = wait.as_secs().max(1);

        let reply: Option<(String, String)> = redis::cmd("BRPOP")
            .arg(&self.keys.queue)
            .arg(timeout_secs)
            .query_async(&mut conn)
            .await?;

        let Some((_key, payload)) = reply else {
            return Ok(None);
        };

        match serde_json::from_str(&payload) {
            Ok(message) => Ok(Some(message)),
            Err(e) => {
                warn!(queue = %self.keys.queue, error = %e, "dropping undecodable task message");
                Err(e.into())
            }
        }
    }

    async fn record(&self, status: TaskStatus) -> Result<(), QueueError> {
        let payload = serde_json::to_string(&status)?;
        let mut conn = self.results.clone();

        let _: () = redis::cmd("SET")
            .arg(self.keys.result(status.task_id))
            .arg(payload)
            .arg("EX")
            .arg(self.result_ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn status(&self, task_id: TaskId) -> Result<TaskStatus, QueueError> {
        let mut conn = self.results.clone();
        let raw: Option<String> = redis::cmd("GET")
            .arg(self.keys.result(task_id))
            .query_async(&mut conn)
            .await?;

        match raw {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(TaskStatus::pending(task_id)),
        }
    }
}

/// Key layout under one queue name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QueueKeys {
    queue: String,
    result_prefix: String,
}

impl QueueKeys {
    fn new(queue_name: &str) -> Self {
        Self {
            queue: format!("{queue_name}:tasks"),
            result_prefix: format!("{queue_name}:task-result:"),
        }
    }

    fn result(&self, task_id: TaskId) -> String {
        format!("{}{}", self.result_prefix, task_id)
    }
}
