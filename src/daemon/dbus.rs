use crate::daemon::{DBUS_NAME, DBUS_PATH};
use crate::monitor::ThresholdMonitor;
use anyhow::{Context, Result};
use std::sync::Arc;
use zbus::interface;

pub struct MofangBarService {
    monitor: Arc<ThresholdMonitor>,
}

impl MofangBarService {
    pub fn new(monitor: Arc<ThresholdMonitor>) -> Self {
        Self { monitor }
    }
}

#[interface(name = "com.github.mofang.Bar")]
impl MofangBarService {
    async fn report(&self) -> zbus::fdo::Result<String> {
        tracing::info!("D-Bus Report called");
        self.monitor.on_demand_report().await.map_err(|e| {
            tracing::warn!(error = %e, "On-demand balance query failed");
            zbus::fdo::Error::Failed("balance query failed".to_string())
        })
    }

    async fn check(&self) -> zbus::fdo::Result<String> {
        tracing::info!("D-Bus Check called");
        match self.monitor.scheduled_check().await {
            Ok(outcome) => Ok(outcome.to_string()),
            Err(e) => {
                tracing::error!(error = %e, "Triggered check failed");
                Err(zbus::fdo::Error::Failed("balance check failed".to_string()))
            }
        }
    }
}

pub async fn start_dbus_server(monitor: Arc<ThresholdMonitor>) -> Result<zbus::Connection> {
    let connection = zbus::connection::Builder::session()
        .context("Failed to connect to session D-Bus")?
        .name(DBUS_NAME)
        .context("Failed to request D-Bus name")?
        .serve_at(DBUS_PATH, MofangBarService::new(monitor))
        .context("Failed to register D-Bus interface")?
        .build()
        .await
        .context("Failed to start D-Bus service - is another daemon running?")?;

    tracing::info!(name = DBUS_NAME, path = DBUS_PATH, "D-Bus service registered");
    Ok(connection)
}
