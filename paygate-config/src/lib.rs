// Layered configuration for the paygate payment core
//
// Sources are merged in load order: later files and the environment override
// earlier values key by key, so a typical setup is
// `defaults -> paygate.toml -> PAYGATE_* variables`.

pub mod de;
pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;

/// Default environment prefix.
pub const DEFAULT_PREFIX: &str = "PAYGATE";

/// Merged configuration tree
#[derive(Debug, Clone)]
pub struct ConfigManager {
    root: Value,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Empty configuration reading unprefixed environment variables.
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
            env_prefix: None,
        }
    }

    /// Empty configuration reading `PREFIX_*` environment variables.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            root: Value::Object(Map::new()),
            env_prefix: Some(prefix.into()),
        }
    }

    /// Merge environment variables over the current values.
    pub fn load_env(&mut self) -> Result<&mut Self> {
        let loader = EnvLoader::new(self.env_prefix.clone());
        for (path, value) in loader.load()? {
            insert_path(&mut self.root, &path, value);
        }
        Ok(self)
    }

    /// Load a `.env` file into the process environment, then merge the
    /// environment. A missing default `.env` is not an error.
    pub fn load_dotenv(&mut self, path: Option<&Path>) -> Result<&mut Self> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::Dotenv(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        self.load_env()
    }

    /// Merge a JSON, TOML or env file, detected from its extension.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        let data = ConfigLoader::for_path(path)?.load_file(path)?;
        merge_value(&mut self.root, data);
        Ok(self)
    }

    /// Merge configuration text in the given format.
    pub fn load_str(&mut self, content: &str, format: FileFormat) -> Result<&mut Self> {
        let data = ConfigLoader::new(format).parse(content)?;
        merge_value(&mut self.root, data);
        Ok(self)
    }

    /// Set a value at a dotted key (`credentials.user`).
    pub fn set<T: serde::Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| ConfigError::Invalid {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        insert_path(&mut self.root, &split_key(key), value);
        Ok(())
    }

    /// Get the value at a dotted key.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .lookup(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value.clone()).map_err(|e| ConfigError::Invalid {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Get the value at a dotted key, or `default` if absent or mistyped.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Top-level keys.
    pub fn keys(&self) -> Vec<String> {
        self.root
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Merge another manager's values over this one.
    pub fn merge(&mut self, other: &ConfigManager) {
        merge_value(&mut self.root, other.root.clone());
    }

    /// Deserialize the whole tree into `T` and run its validation.
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let config: T = serde_json::from_value(self.root.clone()).map_err(|e| ConfigError::Invalid {
            key: "<root>".to_string(),
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        split_key(key)
            .iter()
            .try_fold(&self.root, |node, segment| node.get(segment.as_str()))
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }
}

fn split_key(key: &str) -> Vec<String> {
    key.split('.').map(str::to_string).collect()
}

/// Insert `value` at `path`, creating (or replacing non-object) parents.
pub(crate) fn insert_path(node: &mut Value, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(first.clone()).or_insert(Value::Null);
        insert_path(child, rest, value);
    }
}

/// Deep-merge `source` into `target`; objects merge key by key, anything
/// else replaces.
fn merge_value(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_nested() {
        let mut manager = ConfigManager::new();
        manager.set("credentials.user", "merchant").unwrap();

        let user: String = manager.get("credentials.user").unwrap();
        assert_eq!(user, "merchant");
        assert!(manager.has("credentials"));
        assert!(!manager.has("credentials.password"));
    }

    #[test]
    fn test_get_or_default() {
        let manager = ConfigManager::new();
        let timeout: u64 = manager.get_or("timeout_secs", 30);
        assert_eq!(timeout, 30);
    }

    #[test]
    fn test_later_sources_override() {
        let mut manager = ConfigManager::new();
        manager
            .load_str(
                r#"{"mode": "test", "credentials": {"user": "a", "vendor": "v"}}"#,
                FileFormat::Json,
            )
            .unwrap()
            .load_str("mode = \"live\"\n[credentials]\nuser = \"b\"\n", FileFormat::Toml)
            .unwrap();

        assert_eq!(manager.get::<String>("mode").unwrap(), "live");
        assert_eq!(manager.get::<String>("credentials.user").unwrap(), "b");
        // untouched siblings survive the deep merge
        assert_eq!(manager.get::<String>("credentials.vendor").unwrap(), "v");
    }

    #[test]
    fn test_mistyped_value_reports_key() {
        let mut manager = ConfigManager::new();
        manager.set("timeout_secs", "soon").unwrap();

        let err = manager.get::<u64>("timeout_secs").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "timeout_secs"));
    }

    #[test]
    fn test_insert_path_replaces_scalar_parent() {
        let mut root = serde_json::json!({ "credentials": "flat" });
        insert_path(&mut root, &["credentials".into(), "user".into()], Value::from("merchant"));
        assert_eq!(root["credentials"]["user"], "merchant");
    }

    #[test]
    fn test_merge_managers() {
        let mut base = ConfigManager::new();
        base.set("mode", "test").unwrap();
        let mut overlay = ConfigManager::new();
        overlay.set("mode", "live").unwrap();

        base.merge(&overlay);
        assert_eq!(base.get::<String>("mode").unwrap(), "live");
        assert_eq!(base.keys(), vec!["mode".to_string()]);
    }
}
