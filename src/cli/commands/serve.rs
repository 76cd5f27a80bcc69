use anyhow::Context;
use tracing::{info, warn};

use crate::auth::ensure_superuser;
use crate::cli::utils::open_store;
use crate::config::AppConfig;
use crate::routes::{app, AppState};

pub async fn handle(config: &AppConfig, port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    info!("Starting Abroad Admission API in {:?} mode", config.environment);

    let store = open_store(config, memory).await?;
    let state = AppState::new(config, store.clone()).context("invalid token configuration")?;

    if config.superuser.password.is_empty() {
        warn!("SUPERUSER_PASSWORD is not set; skipping admin bootstrap");
    } else {
        ensure_superuser(store.as_ref(), &config.superuser, config.security.bcrypt_cost)
            .await
            .context("failed to bootstrap superuser")?;
    }

    tokio::fs::create_dir_all(state.media.root())
        .await
        .with_context(|| format!("failed to create media root {}", state.media.root().display()))?;

    let router = app(state, config);

    let port = port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Listening on http://{}", bind_addr);
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
