use crate::core::error::{BillingError, Result};
use serde::{Deserialize, Serialize};

/// Response code the billing API uses for a successful call.
pub const SUCCESS_CODE: i64 = 1;

/// One billing subject (electricity, cold water, ...) under a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    #[serde(rename = "accountSubjectCode")]
    pub subject_code: String,
    #[serde(rename = "accountSubjectName")]
    pub subject_name: String,
    pub contract_code: String,
    pub energy_account_code: String,
    pub balance_amount: String,
    #[serde(rename = "rechargeAmountDesc", default)]
    pub recharge_desc: Option<String>,
    #[serde(rename = "rechargeAmountList", default)]
    pub recharge_options: Vec<i64>,
    #[serde(rename = "judgeEnergyRechange", default)]
    pub rechargeable: bool,
}

impl AccountBalance {
    pub fn balance(&self) -> Result<f64> {
        self.balance_amount.trim().parse::<f64>().map_err(|_| {
            BillingError::Protocol(format!(
                "balance for {} is not a number: {:?}",
                self.subject_name, self.balance_amount
            ))
        })
    }

    pub fn is_below(&self, threshold: f64) -> Result<bool> {
        Ok(self.balance()? < threshold)
    }
}

/// Decoded `getEnergyRechargeInfo` response, accounts in remote order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub error_level: Option<serde_json::Value>,
    #[serde(rename = "data")]
    pub accounts: Vec<AccountBalance>,
}

impl BalanceReport {
    pub fn is_success(&self) -> bool {
        self.code.map_or(true, |code| code == SUCCESS_CODE)
    }
}
