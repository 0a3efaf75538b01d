//! Integration tests for paygate-config

use paygate_config::*;
use serde::Deserialize;
use std::env;
use std::io::Write;

#[derive(Debug, Deserialize)]
struct GatewaySettings {
    mode: String,
    #[serde(default)]
    timeout_secs: Option<u64>,
    credentials: Login,
}

#[derive(Debug, Deserialize)]
struct Login {
    #[serde(deserialize_with = "paygate_config::de::string")]
    user: String,
}

impl Validate for GatewaySettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::one_of(&self.mode, &["test", "live"], "mode")?;
        ConfigValidator::not_empty(&self.credentials.user, "credentials.user")
    }
}

#[test]
fn test_env_overrides_nested_keys() {
    unsafe {
        env::set_var("PGCFGIT_MODE", "live");
        env::set_var("PGCFGIT_CREDENTIALS__USER", "1234");
        env::set_var("PGCFGIT_TIMEOUT_SECS", "45");
    }

    let mut manager = ConfigManager::with_prefix("PGCFGIT");
    manager
        .load_str(r#"{"mode": "test", "credentials": {"user": "file"}}"#, FileFormat::Json)
        .unwrap()
        .load_env()
        .unwrap();

    let settings: GatewaySettings = manager.load_validated().unwrap();
    assert_eq!(settings.mode, "live");
    assert_eq!(settings.timeout_secs, Some(45));
    // all-digit logins are coerced to numbers by the env loader and back by `de::string`
    assert_eq!(settings.credentials.user, "1234");

    unsafe {
        env::remove_var("PGCFGIT_MODE");
        env::remove_var("PGCFGIT_CREDENTIALS__USER");
        env::remove_var("PGCFGIT_TIMEOUT_SECS");
    }
}

#[test]
fn test_validation_failure_surfaces() {
    let mut manager = ConfigManager::new();
    manager
        .load_str("mode = \"staging\"\n[credentials]\nuser = \"merchant\"\n", FileFormat::Toml)
        .unwrap();

    let err = manager.load_validated::<GatewaySettings>().unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(err.to_string().contains("mode"));
}

#[test]
fn test_load_file_by_extension() {
    let path = env::temp_dir().join(format!("paygate-config-{}.toml", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "mode = \"test\"").unwrap();
        writeln!(file, "[credentials]").unwrap();
        writeln!(file, "user = \"merchant\"").unwrap();
    }

    let mut manager = ConfigManager::new();
    manager.load_file(&path).unwrap();
    let settings: GatewaySettings = manager.load_validated().unwrap();
    assert_eq!(settings.credentials.user, "merchant");

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_file_is_read_error() {
    let mut manager = ConfigManager::new();
    let err = manager.load_file("/nonexistent/paygate.json").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_env_loader_with_prefix() {
    let loader = EnvLoader::new(Some("PGCFGVAR".to_string()));

    unsafe {
        env::set_var("PGCFGVAR_ENDPOINT", "https://pilot-payflowpro.paypal.com");
    }

    assert_eq!(
        loader.load_var("endpoint").unwrap(),
        "https://pilot-payflowpro.paypal.com"
    );

    unsafe {
        env::remove_var("PGCFGVAR_ENDPOINT");
    }
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::KeyNotFound("credentials.password".to_string());
    assert!(err.to_string().contains("credentials.password"));
}
