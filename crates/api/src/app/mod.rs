//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repositories and task queue shared by handlers
//! - `routes/`: HTTP routes + handlers (one file per collection)
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: error type and the uniform `{"error": ...}` body

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use fruitsupply_infra::bootstrap::{Background, Backends};
use fruitsupply_infra::config::AppConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Router plus whatever must stay alive next to it.
pub struct App {
    pub router: Router,
    /// Worker and scheduler; only present when the queue is in-memory (the
    /// persistent deployment runs them in `fruitsupply-worker`).
    pub background: Option<Background>,
}

impl App {
    pub async fn shutdown(self) {
        if let Some(background) = self.background {
            background.shutdown().await;
        }
    }
}

/// Connect backends and build the full HTTP router (used by `main.rs` and
/// the black-box tests).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<App> {
    let backends = Backends::connect(config).await?;

    let background = if config.use_persistent_stores {
        info!("persistent stores: run fruitsupply-worker for tasks and the schedule");
        None
    } else {
        Some(Background::start(&backends, config).await?)
    };

    let services = Arc::new(AppServices::new(&backends));
    Ok(App {
        router: router(services),
        background,
    })
}

pub fn router(services: Arc<AppServices>) -> Router {
    routes::router().layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(Extension(services)),
    )
}
