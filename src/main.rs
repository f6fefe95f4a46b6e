//! Arcade Soccer Server - Authoritative two-player physics match
//!
//! One process hosts exactly one match. The simulation loop starts with the
//! process and never stops; clients join over `/ws`, get a seat or watch, and
//! receive a full state snapshot every tick.

mod app;
mod config;
mod game;
mod http;
mod session;
mod util;
mod ws;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::config::Config;
use crate::http::build_router;
use crate::util::time::{init_server_time, uptime_secs, SIMULATION_TPS};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);
    init_server_time();

    info!(
        addr = %config.server_addr,
        tps = SIMULATION_TPS,
        "Starting Arcade Soccer Server"
    );
    info!(
        win_score = config.win_score,
        goals_per_phase = config.goals_per_phase,
        goal_pause_ms = config.goal_pause_ms,
        disconnect_policy = ?config.disconnect_policy,
        input_rate_limit = config.input_rate_limit,
        "Match rules"
    );

    let state = AppState::new(config.clone());

    // Match loop lives for the whole process, connected or not
    state.game.start();

    let listener = TcpListener::bind(config.server_addr).await?;
    info!(
        page = %format!("http://{}/", config.server_addr),
        ws = %format!("ws://{}/ws", config.server_addr),
        "Listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(uptime_secs = uptime_secs(), "Server stopped");
    Ok(())
}

/// RUST_LOG wins over LOG_LEVEL when both are set
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
