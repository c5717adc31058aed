use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info};

use secweb_api::{build_router, AppState};
use secweb_infrastructure::memory::InMemoryCredentialRepository;
use secweb_shared::config::AppConfig;
use secweb_shared::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry; the guard flushes file output on exit
    let _log_guard = init_telemetry(&config.log);

    info!("{} starting ({})...", config.app.name, config.app.env);

    // Credential store
    let credentials = InMemoryCredentialRepository::from_seeds(&config.users)
        .context("invalid credential seeds")?;

    // Create App State
    let state = match AppState::build(&config, Arc::new(credentials)) {
        Ok(state) => state,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    let store = state.sessions.store().clone();
    info!(
        "Session store ready (idle timeout {:?}, reap interval {}s)",
        store.idle_timeout(),
        config.session.reap_interval_secs
    );
    let reaper = store.spawn_reaper(Duration::from_secs(config.session.reap_interval_secs));

    let app = build_router(state);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let installed = tokio::signal::ctrl_c().await;
        park_on_error("Ctrl+C", installed).await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => park_on_error("SIGTERM", Err(e)).await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}

/// A signal handler that failed to install never completes, so it cannot
/// trigger a shutdown on its own.
async fn park_on_error<E: Display>(signal: &str, installed: Result<(), E>) {
    if let Err(e) = installed {
        error!("Failed to install {} handler: {}", signal, e);
        std::future::pending::<()>().await;
    }
}
