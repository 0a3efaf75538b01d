// Environment variable loading

use crate::{ConfigError, Result};
use serde_json::Value;
use std::env;

/// Separator for nested keys: `PAYGATE_CREDENTIALS__USER` -> `credentials.user`.
pub const NESTING_SEPARATOR: &str = "__";

/// Loads prefixed environment variables as nested configuration entries.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Collect matching variables as `(path, value)` pairs.
    ///
    /// With a prefix, only `PREFIX_*` variables are read and the prefix is
    /// stripped. Path segments are lowercased; values are coerced with
    /// [`coerce`].
    pub fn load(&self) -> Result<Vec<(Vec<String>, Value)>> {
        Ok(self.collect(env::vars()))
    }

    fn collect(&self, vars: impl Iterator<Item = (String, String)>) -> Vec<(Vec<String>, Value)> {
        let mut entries: Vec<(Vec<String>, Value)> = vars
            .filter_map(|(key, value)| {
                let stripped = match &self.prefix {
                    Some(prefix) => key.strip_prefix(prefix.as_str())?.strip_prefix('_')?,
                    None => key.as_str(),
                };
                let path: Vec<String> = stripped
                    .split(NESTING_SEPARATOR)
                    .map(str::to_lowercase)
                    .collect();
                if path.iter().any(String::is_empty) {
                    return None;
                }
                Some((path, coerce(&value)))
            })
            .collect();
        // deterministic order so nested keys always override their parents
        entries.sort_by(|a, b| a.0.len().cmp(&b.0.len()).then_with(|| a.0.cmp(&b.0)));
        entries
    }

    /// Read a single variable, applying the prefix.
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::Env)
    }

    /// Read a single variable with a fallback.
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Coerce a raw environment string into a JSON scalar.
///
/// `true`/`false` become booleans and plain integers become numbers;
/// everything else stays a string. Leading zeros keep the value a string so
/// identifiers such as `0042` survive unchanged.
pub fn coerce(raw: &str) -> Value {
    match raw {
        "true" | "TRUE" | "True" => return Value::Bool(true),
        "false" | "FALSE" | "False" => return Value::Bool(false),
        _ => {}
    }
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let leading_zero = digits.len() > 1 && digits.starts_with('0');
    if !leading_zero {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::from(n);
        }
    }
    Value::String(raw.to_string())
}
