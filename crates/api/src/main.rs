use std::sync::Arc;

use anyhow::Context;

use salon_api::app::{self, services};
use salon_infra::{AppConfig, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    salon_observability::init();

    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;

    if config.auth.uses_dev_secret() {
        tracing::warn!("auth.jwt_secret not set; using insecure dev default");
    }

    let directory = services::build_directory(&config).await?;
    let services = Arc::new(
        services::AppServices::new(&config, directory.clone()).context("invalid password hashing parameters")?,
    );

    seed::bootstrap_admin(directory, services.hasher.clone(), &config.bootstrap)
        .await
        .context("failed to seed bootstrap administrator")?;

    let app = app::build_app(&config, services)?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(addr = %listener.local_addr()?, prefix = %config.server.path_prefix, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
