//! Startup wiring shared by the API and worker binaries.

use std::sync::Arc;

use anyhow::Context;
use tokio_cron_scheduler::JobScheduler;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::document_store::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore};
use crate::repository::{FruitRepository, InventoryRepository};
use crate::scheduler::build_scheduler;
use crate::tasks::{reset_inventory, InMemoryTaskQueue, RedisTaskQueue, TaskQueue, TaskRegistry, Worker, WorkerConfig, WorkerHandle};

const PG_MAX_CONNECTIONS: u32 = 10;

/// Store and queue handles, constructed once per process.
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn DocumentStore>,
    pub queue: Arc<dyn TaskQueue>,
}

impl Backends {
    /// Connect per `config` and register collection constraints.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let backends = if config.use_persistent_stores {
            let store = PostgresDocumentStore::connect(&config.database_url, PG_MAX_CONNECTIONS)
                .await
                .context("connecting to document store")?;
            let queue = RedisTaskQueue::connect(
                &config.task_broker_url,
                &config.task_result_backend,
                &config.task_queue_name,
            )
            .await
            .context("connecting to task broker")?
            .with_result_ttl(config.task_result_ttl);
            info!(queue = %config.task_queue_name, "using postgres document store and redis task queue");
            Self {
                store: Arc::new(store),
                queue: Arc::new(queue),
            }
        } else {
            info!("using in-memory document store and task queue");
            Self {
                store: Arc::new(InMemoryDocumentStore::new()),
                queue: Arc::new(InMemoryTaskQueue::new().with_result_ttl(config.task_result_ttl)),
            }
        };

        FruitRepository::new(backends.store.clone())
            .init()
            .await
            .context("registering fruit name constraint")?;

        Ok(backends)
    }

    /// Registry of every task this service runs.
    pub fn task_registry(&self) -> TaskRegistry {
        let mut registry = TaskRegistry::new();
        reset_inventory::register(&mut registry, InventoryRepository::new(self.store.clone()));
        registry
    }
}

/// Worker plus scheduler. Keep alive for the life of the process.
pub struct Background {
    worker: WorkerHandle,
    scheduler: JobScheduler,
}

impl Background {
    pub async fn start(backends: &Backends, config: &AppConfig) -> anyhow::Result<Self> {
        let worker = Worker::new(
            backends.queue.clone(),
            backends.task_registry(),
            WorkerConfig::default().with_name(config.task_queue_name.clone()),
        )
        .spawn();

        let scheduler = build_scheduler(backends.queue.clone(), config.reset_schedule.clone())
            .await
            .context("starting scheduler")?;

        Ok(Self { worker, scheduler })
    }

    pub async fn shutdown(mut self) {
        if let Err(e) = self.scheduler.shutdown().await {
            warn!(error = %e, "scheduler shutdown failed");
        }
        self.worker.shutdown().await;
        info!("background tasks stopped");
    }
}
