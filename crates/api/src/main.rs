use anyhow::Context;

use eoi_api::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    eoi_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        persistent = config.use_persistent_stores,
        database = ?config.database,
        "starting"
    );

    let app = eoi_api::app::build_app(&config)
        .await
        .context("failed to initialise stores")?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
