use clap::Parser;
use tokio::signal::unix::{SignalKind, signal};
use tracing_subscriber::EnvFilter;

use tours_api::config::Config;
use tours_api::seed::load_seed_file;
use tours_api::state::AppState;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to register SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = tokio::signal::ctrl_c() => {}
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_tracing(config.log_json);

    let state = AppState::default();
    if let Some(path) = &config.seed_file {
        if let Err(e) = load_seed_file(&state.tours, path) {
            tracing::error!(path = %path.display(), error = %e, "failed to seed tours");
            std::process::exit(1);
        }
    }

    let app = tours_api::app(state);

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(addr = %config.addr, error = %e, "failed to bind");
            std::process::exit(1);
        });

    tracing::info!("tours-api listening on {}", config.addr);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
    tracing::info!("shutdown complete");
}
