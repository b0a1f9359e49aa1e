use crate::core::settings::NotificationBackend;
use anyhow::{Context, Result};
use async_trait::async_trait;
use notify_rust::Notification;
use std::sync::Arc;

const APP_NAME: &str = "mofang-bar";

/// Outbound message transport. Delivery is fire-and-forget for callers.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, recipient: &str, text: &str) -> Result<()>;
}

pub fn build_notifier(backend: NotificationBackend) -> Arc<dyn Notifier> {
    match backend {
        NotificationBackend::Desktop => Arc::new(DesktopNotifier),
        NotificationBackend::Log => Arc::new(LogNotifier),
    }
}

pub struct DesktopNotifier;

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn send_message(&self, recipient: &str, text: &str) -> Result<()> {
        let summary = format!("魔方生活余额提醒 ({})", recipient);
        let body = text.trim_end().to_string();

        tokio::task::spawn_blocking(move || {
            Notification::new()
                .summary(&summary)
                .body(&body)
                .appname(APP_NAME)
                .timeout(notify_rust::Timeout::Milliseconds(10000))
                .show()
                .map(|_| ())
        })
        .await
        .context("Notification task panicked")?
        .context("Failed to show desktop notification")?;

        tracing::info!(recipient, "Sent low balance notification");
        Ok(())
    }
}

pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_message(&self, recipient: &str, text: &str) -> Result<()> {
        tracing::warn!(recipient, message = %text.trim_end(), "Low balance reminder");
        Ok(())
    }
}
