use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use control_plane_core::SystemClock;
use control_plane_daemon::{api, config::DaemonConfig, sweeper};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "control-plane", version, about = "Job and session admission API")]
struct Cli {
    /// Where the HTTP API will listen, e.g. 0.0.0.0:8080
    #[arg(long, env = "CONTROL_PLANE_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Bearer token required on /jobs and /sessions. Unset disables auth.
    #[arg(long, env = "CONTROL_PLANE_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// How often expired sessions are reclaimed.
    #[arg(long, env = "CONTROL_PLANE_SWEEP_INTERVAL_SECONDS", default_value_t = 30)]
    sweep_interval_seconds: u64,

    /// Max request body bytes.
    #[arg(long, env = "CONTROL_PLANE_MAX_BODY_BYTES", default_value_t = 1024 * 1024)]
    max_body_bytes: usize,

    /// Allow cross-origin requests from any origin.
    #[arg(long, default_value_t = false)]
    cors_permissive: bool,

    /// Log level (env-filter syntax). RUST_LOG takes precedence when set.
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log));
    fmt().with_target(false).with_env_filter(filter).init();

    let config = DaemonConfig {
        listen: cli.listen,
        auth_token: cli.auth_token,
        sweep_interval_seconds: cli.sweep_interval_seconds,
        max_body_bytes: cli.max_body_bytes,
        cors_permissive: cli.cors_permissive,
    };
    config.validate().context("invalid configuration")?;

    info!("starting control plane with config: {:?}", config);
    if config.auth_token.is_none() {
        info!("no auth token configured; /jobs and /sessions are open");
    }

    let state = api::AppState::new(config.clone(), Arc::new(SystemClock));
    let sweeper = sweeper::spawn_sweeper(state.clone());
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!("listening on http://{}", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
