//! Processor configuration
//!
//! Loaded through `paygate-config`, so every value can come from a file and
//! be overridden by `PAYGATE_*` variables:
//!
//! ```text
//! PAYGATE_MODE=live
//! PAYGATE_ENDPOINT=https://payflowpro.paypal.com
//! PAYGATE_CREDENTIALS__USER=merchant
//! PAYGATE_CREDENTIALS__VENDOR=merchant
//! PAYGATE_CREDENTIALS__PASSWORD=secret
//! PAYGATE_TRANSPORT__KIND=process
//! PAYGATE_TRANSPORT__PROGRAM=/opt/payflow/bin/pfpro
//! ```

use crate::types::GatewayMode;
use paygate_config::{ConfigError, ConfigManager, ConfigValidator, Validate};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

/// Default transport timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const MAX_TIMEOUT_SECS: u64 = 300;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    paygate_config::de::string(deserializer).map(|s| SecretString::new(s.into_boxed_str()))
}

/// Merchant login sent with every request
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(deserialize_with = "paygate_config::de::string")]
    pub user: String,
    #[serde(deserialize_with = "paygate_config::de::string")]
    pub vendor: String,
    /// Reseller id; the gateway default applies when empty
    #[serde(default, deserialize_with = "paygate_config::de::string")]
    pub partner: String,
    #[serde(deserialize_with = "secret")]
    pub password: SecretString,
}

impl Credentials {
    pub fn new(user: impl Into<String>, vendor: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            vendor: vendor.into(),
            partner: String::new(),
            password: SecretString::new(password.into().into_boxed_str()),
        }
    }

    pub fn with_partner(mut self, partner: impl Into<String>) -> Self {
        self.partner = partner.into();
        self
    }

    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

/// Transport selection, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportSettings {
    Http {
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
    Process {
        program: PathBuf,
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
}

impl TransportSettings {
    pub fn timeout_secs(&self) -> u64 {
        match self {
            Self::Http { timeout_secs } | Self::Process { timeout_secs, .. } => *timeout_secs,
        }
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self::Http {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Processor configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Test or live gateway environment
    pub mode: GatewayMode,
    /// Overrides the gateway's endpoint for `mode`
    pub endpoint: Option<String>,
    /// Applied to every request the processor creates
    pub credentials: Option<Credentials>,
    pub transport: TransportSettings,
    /// Log every completed transaction
    #[serde(default = "default_true")]
    pub log_transactions: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            mode: GatewayMode::Test,
            endpoint: None,
            credentials: None,
            transport: TransportSettings::default(),
            log_transactions: true,
        }
    }
}

impl ProcessorConfig {
    /// Load from `PAYGATE_*` environment variables.
    pub fn from_env() -> paygate_config::Result<Self> {
        ConfigManager::default().load_env()?.load_validated()
    }

    /// Load from a file, then apply `PAYGATE_*` overrides.
    pub fn load(path: impl AsRef<Path>) -> paygate_config::Result<Self> {
        ConfigManager::default()
            .load_file(path)?
            .load_env()?
            .load_validated()
    }
}

impl Validate for ProcessorConfig {
    fn validate(&self) -> paygate_config::Result<()> {
        ConfigValidator::in_range(self.transport.timeout_secs(), 1, MAX_TIMEOUT_SECS, "transport.timeout_secs")?;

        if let TransportSettings::Process { program, .. } = &self.transport {
            if program.as_os_str().is_empty() {
                return Err(ConfigError::Validation("transport.program cannot be empty".into()));
            }
        }

        if let Some(endpoint) = &self.endpoint {
            match self.transport {
                TransportSettings::Http { .. } => {
                    ConfigValidator::is_url(endpoint, "endpoint", !self.mode.is_live())?
                }
                TransportSettings::Process { .. } => ConfigValidator::is_host_port(endpoint, "endpoint")?,
            }
        }

        if let Some(credentials) = &self.credentials {
            ConfigValidator::not_empty(&credentials.user, "credentials.user")?;
            ConfigValidator::not_empty(&credentials.vendor, "credentials.vendor")?;
            ConfigValidator::not_empty(credentials.password(), "credentials.password")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paygate_config::FileFormat;

    fn parse(toml: &str) -> paygate_config::Result<ProcessorConfig> {
        ConfigManager::new().load_str(toml, FileFormat::Toml)?.load_validated()
    }

    #[test]
    fn test_defaults() {
        let config = ProcessorConfig::default();
        assert_eq!(config.mode, GatewayMode::Test);
        assert_eq!(config.transport, TransportSettings::Http { timeout_secs: 30 });
        assert!(config.log_transactions);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_toml() {
        let config = parse(
            r#"
            mode = "live"
            endpoint = "payflow.example.com:443"

            [credentials]
            user = "merchant"
            vendor = "merchant"
            partner = "PayPal"
            password = "hunter2"

            [transport]
            kind = "process"
            program = "/opt/payflow/bin/pfpro"
            timeout_secs = 45
            "#,
        )
        .unwrap();

        assert!(config.mode.is_live());
        let credentials = config.credentials.unwrap();
        assert_eq!(credentials.partner, "PayPal");
        assert_eq!(credentials.password(), "hunter2");
        assert_eq!(
            config.transport,
            TransportSettings::Process {
                program: "/opt/payflow/bin/pfpro".into(),
                timeout_secs: 45
            }
        );
    }

    #[test]
    fn test_numeric_credentials_are_strings() {
        let config = parse(
            r#"
            [credentials]
            user = 100200
            vendor = 100200
            password = 9999
            "#,
        )
        .unwrap();
        let credentials = config.credentials.unwrap();
        assert_eq!(credentials.user, "100200");
        assert_eq!(credentials.password(), "9999");
    }

    #[test]
    fn test_live_endpoint_must_be_https() {
        let err = parse(
            r#"
            mode = "live"
            endpoint = "http://payflowpro.example.com"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let config = parse(r#"endpoint = "http://127.0.0.1:8080""#).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://127.0.0.1:8080"));
    }

    #[test]
    fn test_timeout_out_of_range() {
        let err = parse(
            r#"
            [transport]
            kind = "http"
            timeout_secs = 0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("merchant", "merchant", "hunter2");
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }
}
