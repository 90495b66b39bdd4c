//! Infrastructure layer: document store, repositories, task queue, worker,
//! scheduler and process configuration.

pub mod bootstrap;
pub mod config;
pub mod document_store;
pub mod repository;
pub mod scheduler;
pub mod tasks;
