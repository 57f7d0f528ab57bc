//! File-based configuration loading.

use std::io::Write;

use ministry_config::{ConfigError, ConfigLoader, LogFormat};
use tempfile::{Builder, NamedTempFile};

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_loads_toml_file() {
    let file = write_temp(
        ".toml",
        r#"
            [telemetry.logging]
            format = "pretty"

            [audit]
            record_denials = false
        "#,
    );

    let loader = ConfigLoader::new().with_file(file.path()).unwrap();
    assert!(loader.file_loaded());

    let config = loader.load().unwrap();
    assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
    assert!(!config.audit.record_denials);
    assert_eq!(config.authorization.required_permission, "spell:cast");
}

#[test]
fn test_loads_json_file() {
    let file = write_temp(
        ".json",
        r#"{
            "authorization": {
                "required_permission": "spell:cast",
                "roles": { "Auror": ["spell:cast"], "Funcionario": [] }
            }
        }"#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    let model = config.permission_model().unwrap();

    assert!(model.has_permission("Auror", "spell:cast"));
    assert!(model.contains_role("Funcionario"));
    assert!(!model.has_permission("Funcionario", "spell:cast"));
}

#[test]
fn test_unknown_field_in_file_is_rejected() {
    let file = write_temp(
        ".toml",
        r#"
            [audit]
            enabled = true
            shred_records = true
        "#,
    );

    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let file = write_temp(".yaml", "audit:\n  enabled: true\n");

    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn test_optional_file_is_loaded_when_present() {
    let file = write_temp(".toml", "[telemetry]\nenvironment = \"staging\"\n");

    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.telemetry.environment, "staging");
}

#[test]
fn test_dotenv_file_feeds_env_overrides() {
    // Unique prefix so parallel tests never observe these variables.
    let file = write_temp(
        ".env",
        "MINISTRY_DOTENV_TEST__AUDIT__LOG_RECORDS=false\n\
         MINISTRY_DOTENV_TEST__TELEMETRY__SERVICE_NAME=department-of-mysteries\n",
    );

    let config = ConfigLoader::new()
        .with_dotenv_file(file.path())
        .unwrap()
        .with_env_prefix("ministry_dotenv_test")
        .load()
        .unwrap();

    assert!(!config.audit.log_records);
    assert_eq!(config.telemetry.service_name, "department-of-mysteries");
}

#[test]
fn test_missing_dotenv_file_is_an_error() {
    let result = ConfigLoader::new().with_dotenv_file("/nonexistent/.env");
    assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
}
