use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Clone, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    /// Per-message send timeout in seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Clone, Deserialize)]
pub struct SmsConfig {
    /// Base URL of the SMS gateway REST API.
    pub gateway_url: String,
    pub account_id: String,
    pub auth_token: String,
    /// E.164 number the gateway sends from.
    pub from_number: String,
    /// Per-message send timeout in seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_send_timeout_secs() -> u64 {
    10
}

/// Application configuration.
///
/// The `smtp` and `sms` blocks are each all-or-nothing: a fully present block
/// enables the channel, an absent block disables it entirely. There is no
/// partially-degraded mode.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Public base URL used to build response links embedded in notifications.
    pub frontend_url: String,
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
    #[serde(default)]
    pub sms: Option<SmsConfig>,
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Environment variable override convention: any var matching the key path
/// separated by double underscores (e.g. `SMTP__PORT`) overrides the file
/// value.
///
/// Returns a `ConfigError` instead of panicking so the caller can decide how
/// to fail.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml"))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    validate(&app)?;
    Ok(app)
}

fn validate(app: &AppConfig) -> Result<(), ConfigError> {
    if app.database_url.is_empty() {
        return Err(ConfigError::Validation("database_url must be set".into()));
    }
    if app.frontend_url.is_empty() {
        return Err(ConfigError::Validation("frontend_url must be set".into()));
    }
    if let Some(smtp) = &app.smtp {
        if smtp.port == 0 {
            return Err(ConfigError::Validation("smtp.port must be > 0".into()));
        }
        if smtp.server.is_empty() || smtp.from.is_empty() {
            return Err(ConfigError::Validation(
                "smtp.server and smtp.from must be set".into(),
            ));
        }
    }
    if let Some(sms) = &app.sms
        && (sms.gateway_url.is_empty()
            || sms.account_id.is_empty()
            || sms.auth_token.is_empty()
            || sms.from_number.is_empty())
    {
        return Err(ConfigError::Validation(
            "sms requires gateway_url, account_id, auth_token and from_number".into(),
        ));
    }
    Ok(())
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            frontend_url: "https://blood-connect.example".into(),
            smtp: None,
            sms: None,
        }
    }

    #[test]
    fn channels_are_optional() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn smtp_port_zero_rejected() {
        let mut cfg = base_config();
        cfg.smtp = Some(SmtpConfig {
            server: "smtp.example.com".into(),
            port: 0,
            username: "user".into(),
            password: "pass".into(),
            from: "alerts@example.com".into(),
            timeout_secs: 10,
        });
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn partial_sms_block_rejected() {
        let mut cfg = base_config();
        cfg.sms = Some(SmsConfig {
            gateway_url: "https://sms.example.com".into(),
            account_id: String::new(),
            auth_token: "token".into(),
            from_number: "+15550001111".into(),
            timeout_secs: 10,
        });
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn empty_frontend_url_rejected() {
        let mut cfg = base_config();
        cfg.frontend_url = String::new();
        assert!(validate(&cfg).is_err());
    }
}
