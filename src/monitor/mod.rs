mod threshold;

use crate::billing::{BillingClient, ReqwestTransport};
use crate::core::error::Result;
use crate::core::models::BalanceReport;
use crate::core::notifications::{build_notifier, Notifier};
use crate::core::settings::Settings;
use std::fmt;
use std::sync::Arc;

pub use threshold::{evaluate, render_report, DEFAULT_THRESHOLD};

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub reminder_user: Option<String>,
    pub threshold: f64,
    pub contract_code: u64,
}

impl MonitorConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            reminder_user: settings.reminder_user().map(str::to_owned),
            threshold: settings.reminder_threshold,
            contract_code: settings.contract_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No recipient configured; nothing was fetched.
    Skipped,
    Clear,
    Notified { warnings: usize },
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Skipped => write!(f, "skipped: no reminder user configured"),
            CheckOutcome::Clear => write!(f, "all balances above threshold"),
            CheckOutcome::Notified { warnings } => {
                write!(f, "sent reminder for {} low balance(s)", warnings)
            }
        }
    }
}

pub struct ThresholdMonitor {
    client: Arc<BillingClient>,
    notifier: Arc<dyn Notifier>,
    config: MonitorConfig,
}

impl ThresholdMonitor {
    pub fn new(client: Arc<BillingClient>, notifier: Arc<dyn Notifier>, config: MonitorConfig) -> Self {
        Self {
            client,
            notifier,
            config,
        }
    }

    /// Wire up the reqwest transport and configured notifier.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(settings.http.timeout())?);
        let client = BillingClient::new(transport, settings.credentials())
            .with_api_base(settings.http.api_base.clone())?;

        Ok(Self::new(
            Arc::new(client),
            build_notifier(settings.notifications.backend),
            MonitorConfig::from_settings(settings),
        ))
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    pub async fn fetch_report(&self) -> Result<BalanceReport> {
        let report = self.client.get_energy(self.config.contract_code).await?;
        if !report.is_success() {
            tracing::warn!(
                code = ?report.code,
                message = report.message.as_deref().unwrap_or_default(),
                "Billing API reported a non-success code"
            );
        }
        Ok(report)
    }

    /// Periodic job body. Billing errors propagate to the scheduler.
    pub async fn scheduled_check(&self) -> Result<CheckOutcome> {
        let Some(recipient) = self.config.reminder_user.as_deref() else {
            tracing::debug!("No reminder user configured, skipping check");
            return Ok(CheckOutcome::Skipped);
        };

        let report = self.fetch_report().await?;
        let text = evaluate(&report, self.config.threshold)?;

        if text.is_empty() {
            tracing::info!(
                accounts = report.accounts.len(),
                threshold = self.config.threshold,
                "All balances above threshold"
            );
            return Ok(CheckOutcome::Clear);
        }

        let warnings = text.lines().count();
        if let Err(e) = self.notifier.send_message(recipient, &text).await {
            tracing::warn!(recipient, error = %e, "Failed to deliver low balance reminder");
        }

        Ok(CheckOutcome::Notified { warnings })
    }

    pub async fn on_demand_report(&self) -> Result<String> {
        let report = self.fetch_report().await?;
        render_report(&report, self.config.threshold)
    }
}
