use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use gatehouse_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gatehouse_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.jwt_secret_is_default {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }
    tracing::info!(config = ?config, "starting");

    let services = gatehouse_api::app::services::build_services(&config)
        .await
        .context("failed to initialise services")?;
    let app = gatehouse_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
