//! Command implementations.

mod info;
mod listen;
mod run;
mod validate;

pub use info::run_info;
pub use listen::run_listen;
pub use run::run_scheduler;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::StationBlueprint;

use crate::error::ensure_config_exists;

/// Load and validate the configuration at `path`
pub(crate) fn load_blueprint(path: &Path) -> Result<StationBlueprint> {
    ensure_config_exists(path)?;
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Wait for Ctrl+C or SIGTERM
///
/// A handler that cannot be installed is logged and never fires.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
