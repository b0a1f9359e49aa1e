use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("login rejected ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("request failed: {0}")]
    Transport(String),
}

impl BillingError {
    /// Returns a user-friendly suggestion for how to resolve this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            BillingError::Config(_) => {
                Some("Set mobile/password in config.toml or export MF_MOBILE and MF_PASSWORD")
            }
            BillingError::Auth { .. } => Some("Check the Mofang account mobile and password"),
            BillingError::Transport(_) => Some("Check your internet connection and try again"),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BillingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BillingError::Auth {
            status: 401,
            message: "bad password".to_string(),
        };
        assert_eq!(err.to_string(), "login rejected (401): bad password");

        let err = BillingError::Config("missing mobile/password".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: missing mobile/password"
        );
    }

    #[test]
    fn test_suggestions() {
        assert!(BillingError::Config(String::new()).suggestion().is_some());
        assert!(BillingError::Protocol(String::new()).suggestion().is_none());
    }
}
