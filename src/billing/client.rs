use crate::billing::transport::HttpTransport;
use crate::core::error::{BillingError, Result};
use crate::core::models::BalanceReport;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const DEFAULT_API_BASE: &str = "https://renter-api.52mf.com";
pub const DEFAULT_CONTRACT_CODE: u64 = 250806001063;

const LOGIN_PATH: &str = "/renter/login/v1/loginByPassword";
const ENERGY_PATH: &str = "/renter/energy/v1/getEnergyRechargeInfo";
const TOKEN_HEADER: &str = "accessToken";

#[derive(Clone)]
pub struct Credentials {
    pub mobile: String,
    pub password: String,
}

impl Credentials {
    /// Both parts must be present and non-empty.
    pub fn from_parts(mobile: Option<String>, password: Option<String>) -> Option<Self> {
        match (mobile, password) {
            (Some(mobile), Some(password)) if !mobile.is_empty() && !password.is_empty() => {
                Some(Self { mobile, password })
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("mobile", &self.mobile)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Session {
    access_token: Option<String>,
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    fn set_token(&mut self, token: String) {
        self.access_token = Some(token);
    }
}

/// Validate that an API base URL uses HTTPS before credentials are sent to it.
pub fn validate_endpoint(url: &str) -> Result<()> {
    if !url.starts_with("https://") {
        return Err(BillingError::Config(format!(
            "API base must use HTTPS, got: {}",
            url
        )));
    }
    Ok(())
}

/// Client for the Mofang renter API.
///
/// Authentication is lazy: the first authenticated call logs in with the
/// stored credentials and caches the token for the rest of the process.
/// The token check and the login are separate steps, so two callers racing
/// on a fresh client may both log in; the later token simply replaces the
/// earlier one.
pub struct BillingClient {
    transport: Arc<dyn HttpTransport>,
    credentials: Option<Credentials>,
    session: RwLock<Session>,
    api_base: String,
}

impl BillingClient {
    pub fn new(transport: Arc<dyn HttpTransport>, credentials: Option<Credentials>) -> Self {
        Self {
            transport,
            credentials,
            session: RwLock::new(Session::default()),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Result<Self> {
        let api_base = api_base.into();
        validate_endpoint(&api_base)?;
        self.api_base = api_base.trim_end_matches('/').to_string();
        Ok(self)
    }

    #[cfg(test)]
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.token().is_some()
    }

    pub async fn login(&self, mobile: &str, password: &str) -> Result<String> {
        let url = format!("{}{}", self.api_base, LOGIN_PATH);
        let body = json!({
            "mobile": mobile,
            "password": password,
        });

        tracing::debug!(mobile, "Logging in to billing API");
        let response = self.transport.post(&url, &[], Some(&body)).await?;

        if !response.is_success() {
            tracing::warn!(status = response.status, "Login rejected");
            return Err(BillingError::Auth {
                status: response.status,
                message: response.body_excerpt(),
            });
        }

        let value: serde_json::Value = serde_json::from_slice(&response.body)
            .map_err(|e| BillingError::Protocol(format!("login response is not JSON: {}", e)))?;

        let token = match value.pointer("/data/accessToken") {
            Some(serde_json::Value::String(token)) if !token.is_empty() => token.clone(),
            Some(serde_json::Value::String(_)) => {
                return Err(BillingError::Protocol(
                    "data.accessToken is empty".to_string(),
                ))
            }
            Some(_) => {
                return Err(BillingError::Protocol(
                    "data.accessToken is not a string".to_string(),
                ))
            }
            None => {
                return Err(BillingError::Protocol(
                    "login response missing data.accessToken".to_string(),
                ))
            }
        };

        self.session.write().await.set_token(token.clone());
        tracing::info!("Logged in to billing API");

        Ok(token)
    }

    async fn ensure_token(&self) -> Result<String> {
        let cached = self.session.read().await.token().map(str::to_owned);
        if let Some(token) = cached {
            return Ok(token);
        }

        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| BillingError::Config("missing mobile/password".to_string()))?;

        self.login(&credentials.mobile, &credentials.password).await
    }

    pub async fn get_energy(&self, contract_id: u64) -> Result<BalanceReport> {
        let token = self.ensure_token().await?;

        let url = format!(
            "{}{}?contractCode={}&accountSubjectCode=",
            self.api_base, ENERGY_PATH, contract_id
        );

        let response = self
            .transport
            .post(&url, &[(TOKEN_HEADER, token.as_str())], None)
            .await?;

        if !response.is_success() {
            return Err(BillingError::Remote {
                status: response.status,
                message: response.body_excerpt(),
            });
        }

        let report: BalanceReport = serde_json::from_slice(&response.body).map_err(|e| {
            BillingError::Protocol(format!("energy response could not be decoded: {}", e))
        })?;

        tracing::debug!(
            contract_id,
            accounts = report.accounts.len(),
            code = ?report.code,
            "Fetched energy balances"
        );

        Ok(report)
    }
}
