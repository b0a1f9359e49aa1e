use crate::core::error::Result;
use crate::core::models::{AccountBalance, BalanceReport};

pub const DEFAULT_THRESHOLD: f64 = 20.0;

pub fn low_balance_line(account: &AccountBalance) -> String {
    format!("提醒：{} 余额低于阈值!请及时充值\n", account.subject_name)
}

/// Warning lines for every account strictly below `threshold`, in report order.
pub fn evaluate(report: &BalanceReport, threshold: f64) -> Result<String> {
    let mut text = String::new();
    for account in &report.accounts {
        if account.is_below(threshold)? {
            text.push_str(&low_balance_line(account));
        }
    }
    Ok(text)
}

/// One `name：balance` line per account, each followed by its warning when low.
pub fn render_report(report: &BalanceReport, threshold: f64) -> Result<String> {
    let mut text = String::new();
    for account in &report.accounts {
        text.push_str(&format!(
            "{}：{}\n",
            account.subject_name, account.balance_amount
        ));
        if account.is_below(threshold)? {
            text.push_str(&low_balance_line(account));
        }
    }
    Ok(text)
}
