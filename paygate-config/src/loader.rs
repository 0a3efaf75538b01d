// Configuration file loaders

use crate::{ConfigError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Json => "JSON",
            FileFormat::Toml => "TOML",
            FileFormat::Env => "env",
        }
    }
}

/// Parses configuration files into a JSON object tree.
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Pick the loader from the file extension (`.env` files have no stem, so
    /// a bare `.env` name is recognized as well).
    pub fn for_path(path: &Path) -> Result<Self> {
        let is_dotenv = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name == ".env");
        if is_dotenv {
            return Ok(Self::new(FileFormat::Env));
        }

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        FileFormat::from_extension(ext)
            .map(Self::new)
            .ok_or_else(|| ConfigError::UnsupportedFormat(ext.to_string()))
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn load_file(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        self.parse(&content)
    }

    pub fn parse(&self, content: &str) -> Result<Value> {
        let value = match self.format {
            FileFormat::Json => serde_json::from_str(content).map_err(|e| self.parse_error(e))?,
            FileFormat::Toml => {
                let table: toml::Table = toml::from_str(content).map_err(|e| self.parse_error(e))?;
                serde_json::to_value(table).map_err(|e| self.parse_error(e))?
            }
            FileFormat::Env => parse_env(content),
        };

        if !value.is_object() {
            return Err(ConfigError::Parse {
                format: self.format.name(),
                message: "top level must be a table".to_string(),
            });
        }
        Ok(value)
    }

    fn parse_error(&self, err: impl std::fmt::Display) -> ConfigError {
        ConfigError::Parse {
            format: self.format.name(),
            message: err.to_string(),
        }
    }
}

/// `KEY=value` lines; `#` comments and blank lines are skipped, surrounding
/// quotes are removed and `A__B` keys nest like environment variables.
fn parse_env(content: &str) -> Value {
    let mut root = Value::Object(serde_json::Map::new());

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let path: Vec<String> = key
                .trim()
                .split(crate::env::NESTING_SEPARATOR)
                .map(str::to_lowercase)
                .collect();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            crate::insert_path(&mut root, &path, crate::env::coerce(value));
        }
    }

    root
}
