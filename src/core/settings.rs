use crate::billing::{validate_endpoint, Credentials, DEFAULT_API_BASE, DEFAULT_CONTRACT_CODE};
use crate::monitor::DEFAULT_THRESHOLD;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MOBILE_ENV: &str = "MF_MOBILE";
pub const PASSWORD_ENV: &str = "MF_PASSWORD";
pub const MAX_INTERVAL_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mobile: Option<String>,
    pub password: Option<String>,
    pub reminder_user: Option<String>,
    pub reminder_threshold: f64,
    pub contract_code: u64,
    pub schedule: ScheduleSettings,
    pub notifications: NotificationSettings,
    pub http: HttpSettings,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mobile: None,
            password: None,
            reminder_user: None,
            reminder_threshold: DEFAULT_THRESHOLD,
            contract_code: DEFAULT_CONTRACT_CODE,
            schedule: ScheduleSettings::default(),
            notifications: NotificationSettings::default(),
            http: HttpSettings::default(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub interval_hours: u64,
    pub run_on_start: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            interval_hours: 24,
            run_on_start: false,
        }
    }
}

impl ScheduleSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours.saturating_mul(3600))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationBackend {
    Desktop,
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub backend: NotificationBackend,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            backend: NotificationBackend::Desktop,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mofang-bar").join("config.toml"))
    }

    /// Load from `path`, or the default config location when `None`.
    ///
    /// Only a missing default file falls back to defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p, true),
            None => {
                let path = Self::config_path().context("Could not determine config directory")?;
                Self::load_from(&path, false)
            }
        }
    }

    fn load_from(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            tracing::info!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(?path, "Loaded config");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.reminder_threshold.is_finite() {
            anyhow::bail!(
                "reminder_threshold must be a finite number, got {}",
                self.reminder_threshold
            );
        }
        if self.schedule.interval_hours == 0 || self.schedule.interval_hours > MAX_INTERVAL_HOURS {
            anyhow::bail!(
                "schedule.interval_hours must be between 1 and {}, got {}",
                MAX_INTERVAL_HOURS,
                self.schedule.interval_hours
            );
        }
        if self.http.timeout_secs == 0 {
            anyhow::bail!("http.timeout_secs must be at least 1");
        }
        validate_endpoint(&self.http.api_base)?;
        Ok(())
    }

    /// Credentials from config, falling back to `MF_MOBILE` / `MF_PASSWORD`.
    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials_with(|key| std::env::var(key).ok())
    }

    fn credentials_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<Credentials> {
        let pick = |configured: &Option<String>, key: &str| {
            configured
                .clone()
                .filter(|v| !v.is_empty())
                .or_else(|| env(key))
        };

        Credentials::from_parts(
            pick(&self.mobile, MOBILE_ENV),
            pick(&self.password, PASSWORD_ENV),
        )
    }

    pub fn reminder_user(&self) -> Option<&str> {
        self.reminder_user.as_deref().filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.mobile.is_none());
        assert!(settings.reminder_user.is_none());
        assert!((settings.reminder_threshold - 20.0).abs() < f64::EPSILON);
        assert_eq!(settings.contract_code, 250806001063);
        assert_eq!(settings.schedule.interval(), Duration::from_secs(24 * 3600));
        assert!(!settings.schedule.run_on_start);
        assert_eq!(settings.notifications.backend, NotificationBackend::Desktop);
        assert_eq!(settings.http.api_base, "https://renter-api.52mf.com");
        assert_eq!(settings.http.timeout(), Duration::from_secs(30));
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.reminder_threshold = f64::NAN;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.schedule.interval_hours = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.schedule.interval_hours = MAX_INTERVAL_HOURS;
        assert!(settings.validate().is_ok());

        settings.schedule.interval_hours = MAX_INTERVAL_HOURS + 1;
        assert!(settings.validate().is_err());

        settings.schedule.interval_hours = 10_000_000_000_000_000;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.http.timeout_secs = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.http.api_base = "http://renter-api.52mf.com".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            mobile = "13800000000"
            password = "secret"
            reminder_user = "alice"
            reminder_threshold = 50
            contract_code = 123456
            debug = true

            [schedule]
            interval_hours = 6
            run_on_start = true

            [notifications]
            backend = "log"

            [http]
            timeout_secs = 10
        "#;

        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.mobile.as_deref(), Some("13800000000"));
        assert_eq!(settings.reminder_user(), Some("alice"));
        assert!((settings.reminder_threshold - 50.0).abs() < f64::EPSILON);
        assert_eq!(settings.contract_code, 123456);
        assert!(settings.debug);
        assert_eq!(settings.schedule.interval(), Duration::from_secs(6 * 3600));
        assert!(settings.schedule.run_on_start);
        assert_eq!(settings.notifications.backend, NotificationBackend::Log);
        assert_eq!(settings.http.timeout_secs, 10);
        assert_eq!(settings.http.api_base, "https://renter-api.52mf.com");
    }

    #[test]
    fn test_empty_reminder_user_is_unset() {
        let settings: Settings = toml::from_str(r#"reminder_user = """#).unwrap();
        assert!(settings.reminder_user().is_none());
    }

    #[test]
    fn test_credentials_from_config() {
        let settings = Settings {
            mobile: Some("13800000000".to_string()),
            password: Some("secret".to_string()),
            ..Settings::default()
        };

        let creds = settings.credentials_with(|_| None).unwrap();
        assert_eq!(creds.mobile, "13800000000");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_credentials_env_fallback() {
        let settings = Settings {
            mobile: Some("13800000000".to_string()),
            ..Settings::default()
        };

        let env = |key: &str| match key {
            MOBILE_ENV => Some("13900000000".to_string()),
            PASSWORD_ENV => Some("from-env".to_string()),
            _ => None,
        };

        let creds = settings.credentials_with(env).unwrap();
        assert_eq!(creds.mobile, "13800000000");
        assert_eq!(creds.password, "from-env");
    }

    #[test]
    fn test_credentials_missing() {
        let settings = Settings::default();
        assert!(settings.credentials_with(|_| None).is_none());
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let path = std::env::temp_dir().join("mofang-bar-test-missing-config.toml");
        let settings = Settings::load_from(&path, false).unwrap();
        assert!((settings.reminder_threshold - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("mofang-bar-test-typo-config.toml");
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_explicit_file() {
        let path = std::env::temp_dir().join(format!(
            "mofang-bar-test-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "reminder_user = \"alice\"\nreminder_threshold = 35.5\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.reminder_user(), Some("alice"));
        assert!((settings.reminder_threshold - 35.5).abs() < f64::EPSILON);
    }
}
