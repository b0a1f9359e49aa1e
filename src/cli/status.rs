use crate::core::error::BillingError;
use crate::core::models::{AccountBalance, BalanceReport};
use crate::core::settings::Settings;
use crate::monitor::ThresholdMonitor;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
struct StatusOutput {
    contract_code: u64,
    threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    accounts: Vec<AccountStatus>,
    #[serde(with = "chrono::serde::ts_seconds")]
    fetched_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct AccountStatus {
    subject_code: String,
    subject_name: String,
    balance: String,
    below_threshold: bool,
    rechargeable: bool,
    recharge_options: Vec<i64>,
}

pub async fn run(settings: &Settings, json: bool) -> Result<()> {
    let monitor = ThresholdMonitor::from_settings(settings)?;

    if !json {
        let text = monitor.on_demand_report().await.map_err(with_hint)?;
        if text.is_empty() {
            println!("No energy accounts found for contract {}", settings.contract_code);
        } else {
            print!("{}", text);
        }
        return Ok(());
    }

    let report = monitor.fetch_report().await.map_err(with_hint)?;
    let output = build_output(report, settings.contract_code, monitor.threshold())?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn build_output(report: BalanceReport, contract_code: u64, threshold: f64) -> Result<StatusOutput> {
    let accounts = report
        .accounts
        .iter()
        .map(|account| account_status(account, threshold))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(StatusOutput {
        contract_code,
        threshold,
        code: report.code,
        message: report.message,
        accounts,
        fetched_at: Utc::now(),
    })
}

fn account_status(
    account: &AccountBalance,
    threshold: f64,
) -> std::result::Result<AccountStatus, BillingError> {
    Ok(AccountStatus {
        subject_code: account.subject_code.clone(),
        subject_name: account.subject_name.clone(),
        balance: account.balance_amount.clone(),
        below_threshold: account.is_below(threshold)?,
        rechargeable: account.rechargeable,
        recharge_options: account.recharge_options.clone(),
    })
}

fn with_hint(error: BillingError) -> anyhow::Error {
    match error.suggestion() {
        Some(hint) => anyhow::anyhow!("{}\n  hint: {}", error, hint),
        None => error.into(),
    }
}
