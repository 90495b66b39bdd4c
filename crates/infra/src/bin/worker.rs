//! Standalone task worker and scheduler for persistent deployments.

use anyhow::bail;

use fruitsupply_infra::bootstrap::{Background, Backends};
use fruitsupply_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fruitsupply_observability::init();

    let config = AppConfig::from_env()?;
    if !config.use_persistent_stores {
        bail!("USE_PERSISTENT_STORES is false: the in-memory queue lives inside the API process, which runs its own worker");
    }

    let backends = Backends::connect(&config).await?;
    let background = Background::start(&backends, &config).await?;
    tracing::info!(queue = %config.task_queue_name, "worker running");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    background.shutdown().await;
    Ok(())
}
