use anyhow::Context;

use shopfront_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shopfront_observability::init();

    let config = AppConfig::from_env()?;
    let app = shopfront_api::app::build_app(&config)?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        db = %config.db_path.display(),
        rules = %config.access_rules,
        "shopfront listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
