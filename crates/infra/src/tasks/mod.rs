//! Task queue: named jobs with positional JSON arguments.
//!
//! ## Components
//!
//! - `TaskQueue`: broker (FIFO of `TaskMessage`s) plus result backend
//! - `Worker`: consumes messages and runs the registered handler by name
//! - `reset_inventory`: the one task this service defines
//!
//! Fire-and-forget: no retries, backoff or dead-lettering. A failed task is
//! recorded as `failure` in the result backend and dropped.

pub mod in_memory;
pub mod queue;
pub mod redis;
pub mod reset_inventory;
pub mod types;
pub mod worker;

pub use in_memory::InMemoryTaskQueue;
pub use queue::{QueueError, TaskQueue, DEFAULT_RESULT_TTL};
pub use self::redis::RedisTaskQueue;
pub use types::{TaskError, TaskMessage, TaskState, TaskStatus};
pub use worker::{TaskRegistry, Worker, WorkerConfig, WorkerHandle, WorkerStats};
