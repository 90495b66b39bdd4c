use anyhow::Context;

use fruitsupply_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fruitsupply_observability::init();

    let config = AppConfig::from_env()?;
    let app = fruitsupply_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app.router.clone())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await?;

    app.shutdown().await;
    Ok(())
}
