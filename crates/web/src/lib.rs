//! Browser chat front-end: session sign-in, a guarded chat page, and replies revealed one
//! character at a time over server-sent events.

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod palette;
pub mod routes;
pub mod session;
pub mod state;
pub mod theme;

use std::path::PathBuf;

use snafu::ResultExt;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::info;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use routes::router;
pub use state::AppState;

use error::{BindSnafu, ConfigSnafu, ServeSnafu};

/// Loads configuration from `config_path` (or the default location) and serves until shutdown.
pub async fn run(config_path: Option<PathBuf>) -> AppResult<()> {
    let config = AppConfig::load(config_path).context(ConfigSnafu)?;
    serve(config).await
}

pub async fn serve(config: AppConfig) -> AppResult<()> {
    info!("Initializing state...");
    let state = AppState::new(config)?;

    let address = state.config.listen_address();
    let listener = TcpListener::bind(&address).await.context(BindSnafu {
        stage: "bind-listener",
        address: address.clone(),
    })?;
    info!("Server running on http://{address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(ServeSnafu { stage: "serve" })?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(error) => {
                tracing::error!("failed to listen for Ctrl+C: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(error) => {
                tracing::error!("failed to install SIGTERM handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
