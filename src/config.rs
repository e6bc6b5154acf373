use config::{Config, ConfigError, Environment, File};
use mail_core::SenderDefaults;
use mail_mandrill::MandrillClient;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Mandrill API access
    pub mandrill: MandrillConfig,
    /// Fallback sender/recipient identity for email
    pub defaults: SenderDefaults,
    /// SMS configuration
    pub sms: SmsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Mandrill API configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MandrillConfig {
    /// API key (required for any send)
    pub api_key: String,
    /// API base URL; override for testing/mocking
    pub base_url: String,
    /// Per-call network timeout in seconds (default: 30)
    pub timeout_seconds: u64,
}

/// SMS configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SmsConfig {
    /// Sender phone number, E.164 (must be verified with the provider)
    pub from_phone: Option<String>,
    /// Default recipient phone number, E.164
    pub to_phone: Option<String>,
    /// Consent tag: onetime, recurring, or recurring-no-confirm
    pub consent: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: json or pretty (default: pretty)
    pub format: String,
}

impl Default for MandrillConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://mandrillapp.com".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            from_phone: None,
            to_phone: None,
            consent: "onetime".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mandrill: MandrillConfig::default(),
            defaults: SenderDefaults::default(),
            sms: SmsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(Config::try_from(&AppConfig::default())?)
            // Add configuration file based on environment
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local configuration file (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with MAILKIT_)
            .add_source(Environment::with_prefix("MAILKIT").separator("__"))
            .build()?;

        let mut cfg: AppConfig = s.try_deserialize()?;
        cfg.apply_legacy_env();
        Ok(cfg)
    }

    /// Honor the unprefixed variable names the original deployment used, so
    /// an existing `.env` keeps working.
    fn apply_legacy_env(&mut self) {
        if let Ok(key) = env::var("MANDRILL_API_KEY") {
            self.mandrill.api_key = key;
        }
        if let Ok(v) = env::var("DEFAULT_FROM_EMAIL") {
            self.defaults.from_email = Some(v);
        }
        if let Ok(v) = env::var("DEFAULT_FROM_NAME") {
            self.defaults.from_name = Some(v);
        }
        if let Ok(v) = env::var("DEFAULT_TO_EMAIL") {
            self.defaults.to_email = Some(v);
        }
        if let Ok(v) = env::var("DEFAULT_TO_NAME") {
            self.defaults.to_name = Some(v);
        }
        if let Ok(v) = env::var("SMS_FROM_PHONE") {
            self.sms.from_phone = Some(v);
        }
        if let Ok(v) = env::var("SMS_TO_PHONE") {
            self.sms.to_phone = Some(v);
        }
    }

    /// Construct a client from this configuration.
    pub fn client(&self) -> MandrillClient {
        MandrillClient::with_timeout(
            self.mandrill.api_key.clone(),
            self.mandrill.base_url.clone(),
            Duration::from_secs(self.mandrill.timeout_seconds),
        )
    }
}
