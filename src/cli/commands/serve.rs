use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::auth::verifier_from_config;
use crate::config::AppConfig;
use crate::database;
use crate::logging::init_tracing;
use crate::state::{AppState, Stores};

pub async fn handle(port: Option<u16>, in_memory: bool) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(&config.logging);

    if let Some(port) = port {
        config.server.port = port;
    }

    let stores = if in_memory {
        tracing::warn!("using in-memory storage; data is lost on exit");
        Stores::in_memory()
    } else {
        let url = config.require_database_url()?;
        let pool = database::connect(url, config.database.max_connections)
            .await
            .context("failed to connect to database")?;
        Stores::postgres(pool)
    };

    let verifier = verifier_from_config(&config.auth).context("failed to build identity verifier")?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let state = AppState::new(config, verifier, stores);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, crate::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
