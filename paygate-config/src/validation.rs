// Configuration validation

use crate::{ConfigError, Result};

/// Post-deserialization checks run by [`crate::ConfigManager::load_validated`].
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable field checks
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
        }
        Ok(())
    }

    pub fn in_range<T: PartialOrd + std::fmt::Display>(value: T, min: T, max: T, field: &str) -> Result<()> {
        if value < min || value > max {
            return Err(ConfigError::Validation(format!(
                "{} must be between {} and {}, got {}",
                field, min, max, value
            )));
        }
        Ok(())
    }

    pub fn one_of(value: &str, allowed: &[&str], field: &str) -> Result<()> {
        if !allowed.contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be one of [{}], got `{}`",
                field,
                allowed.join(", "),
                value
            )));
        }
        Ok(())
    }

    /// Gateway URLs carry card data, so only `https` is accepted unless
    /// `allow_plain` is set (local mock gateways).
    pub fn is_url(value: &str, field: &str, allow_plain: bool) -> Result<()> {
        let secure = value.starts_with("https://");
        let plain = value.starts_with("http://");
        if !(secure || (allow_plain && plain)) {
            return Err(ConfigError::Validation(format!(
                "{} must be an {} URL",
                field,
                if allow_plain { "http(s)" } else { "https" }
            )));
        }
        Ok(())
    }

    /// `host:port` with a non-zero port.
    pub fn is_host_port(value: &str, field: &str) -> Result<()> {
        let valid = value
            .rsplit_once(':')
            .filter(|(host, _)| !host.is_empty())
            .and_then(|(_, port)| port.parse::<u16>().ok())
            .is_some_and(|port| port != 0);
        if !valid {
            return Err(ConfigError::Validation(format!(
                "{} must be in host:port form",
                field
            )));
        }
        Ok(())
    }
}
