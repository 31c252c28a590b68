use std::sync::Arc;

use anyhow::Context;

use cronocodex_api::app::{self, services::AppServices};
use cronocodex_api::{bootstrap, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cronocodex_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = Arc::new(AppServices::in_memory(config.auth_config()));

    if let Some(admin) = &config.bootstrap_admin {
        bootstrap::seed_general_admin(&services, admin).context("failed to seed general admin")?;
    }

    let app = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
