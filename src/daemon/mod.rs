mod dbus;
mod polling;

use crate::core::settings::Settings;
use crate::monitor::ThresholdMonitor;
use anyhow::Result;
use std::sync::Arc;

use polling::PollingLoop;

pub const DBUS_NAME: &str = "com.github.mofang.Bar";
pub const DBUS_PATH: &str = "/com/github/mofang/Bar";

pub async fn run(settings: &Settings, monitor: Arc<ThresholdMonitor>) -> Result<()> {
    tracing::info!("Starting mofang-bar daemon");

    let _dbus_connection = dbus::start_dbus_server(Arc::clone(&monitor)).await?;

    let polling = PollingLoop::new(settings.schedule.interval(), settings.schedule.run_on_start);
    polling
        .run(|| monitor.scheduled_check(), shutdown_signal())
        .await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
