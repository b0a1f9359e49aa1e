use crate::cli::report::call_daemon;
use crate::core::settings::Settings;
use crate::monitor::ThresholdMonitor;
use anyhow::{Context, Result};

pub async fn run(settings: &Settings, via_daemon: bool) -> Result<()> {
    if via_daemon {
        let outcome = call_daemon("Check").await?;
        println!("{}", outcome);
        return Ok(());
    }

    let monitor = ThresholdMonitor::from_settings(settings)?;

    let outcome = monitor
        .scheduled_check()
        .await
        .context("Balance check failed")?;

    println!("{}", outcome);
    Ok(())
}
