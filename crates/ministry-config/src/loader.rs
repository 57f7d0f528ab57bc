//! Layered configuration loading.
//!
//! Sources are applied in call order; `load` finishes with environment
//! overrides and validation:
//!
//! ```text
//! defaults / preset → file or string → .env → PREFIX__SECTION__KEY → validate
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ConfigError, LogFormat, MinistryConfig};

/// Builds a [`MinistryConfig`] from defaults, a file and the environment.
///
/// A file or string replaces the whole configuration; sections it omits fall
/// back to their defaults. Environment overrides are read once, in
/// [`load`](Self::load).
///
/// ```no_run
/// use ministry_config::ConfigLoader;
///
/// # fn main() -> Result<(), ministry_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_production()
///     .with_optional_file("/etc/ministry/ministry.toml")?
///     .with_dotenv()?
///     .with_env_prefix("MINISTRY")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: MinistryConfig,
    env_prefix: Option<String>,
    file_loaded: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// A loader holding the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: MinistryConfig::default(),
            env_prefix: None,
            file_loaded: false,
        }
    }

    /// Resets to [`MinistryConfig::default`].
    #[must_use]
    pub fn with_defaults(self) -> Self {
        self.replace(MinistryConfig::default())
    }

    /// Resets to [`MinistryConfig::development`].
    ///
    /// ```
    /// use ministry_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(self) -> Self {
        self.replace(MinistryConfig::development())
    }

    /// Resets to [`MinistryConfig::production`].
    #[must_use]
    pub fn with_production(self) -> Self {
        self.replace(MinistryConfig::production())
    }

    /// Reads a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing or unreadable, has another extension,
    /// does not parse, or contains an unknown key.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format = Format::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        let config = format.parse(&content)?;

        tracing::debug!(path = %path.display(), "configuration file loaded");
        let mut loader = self.replace(config);
        loader.file_loaded = true;
        Ok(loader)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Parses `content` as `format` (`"toml"` or `"json"`).
    ///
    /// # Errors
    ///
    /// Fails on an unknown format or content that does not parse.
    ///
    /// ```
    /// use ministry_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[audit]\nrecord_denials = false", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(!config.audit.record_denials);
    /// ```
    pub fn with_string(self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let config = Format::from_name(format)?.parse(content)?;
        Ok(self.replace(config))
    }

    /// Enables `PREFIX__SECTION__KEY` overrides, e.g.
    /// `MINISTRY__AUDIT__RECORD_DENIALS=false` or
    /// `MINISTRY__TELEMETRY__LOGGING__LEVEL=debug`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads `.env` from the working directory or a parent, if there is one.
    ///
    /// # Errors
    ///
    /// Fails when a `.env` file is found but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), ".env loaded");
                Ok(self)
            }
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads the given dotenv file. Variables already in the process
    /// environment win.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing or cannot be parsed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        dotenvy::from_path(path)?;
        Ok(self)
    }

    /// Whether a file was read.
    #[must_use]
    pub fn file_loaded(&self) -> bool {
        self.file_loaded
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Fails when an override does not parse or validation rejects the
    /// result.
    pub fn load(mut self) -> Result<MinistryConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let marker = format!("{prefix}__");
            let vars: BTreeMap<String, String> =
                env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();

            for (key, value) in &vars {
                self.apply_override(key, value, &prefix)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration as it stands, without overrides or
    /// validation.
    #[must_use]
    pub fn load_unvalidated(self) -> MinistryConfig {
        self.config
    }

    fn replace(mut self, config: MinistryConfig) -> Self {
        self.config = config;
        self
    }

    fn apply_override(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let path = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_var(key, "missing prefix"))?;
        let var = EnvOverride { key, value };

        let parts: Vec<&str> = path.split("__").collect();
        let known = match parts.as_slice() {
            ["TELEMETRY", rest @ ..] => self.override_telemetry(rest, &var)?,
            ["AUTHORIZATION", "REQUIRED_PERMISSION"] => {
                self.config.authorization.required_permission = var.text();
                true
            }
            ["AUDIT", field] => self.override_audit(field, &var)?,
            _ => false,
        };

        if !known {
            tracing::debug!(var = key, "ignoring unknown configuration variable");
        }
        Ok(())
    }

    fn override_telemetry(&mut self, field: &[&str], var: &EnvOverride<'_>) -> Result<bool, ConfigError> {
        let telemetry = &mut self.config.telemetry;
        match field {
            ["SERVICE_NAME"] => telemetry.service_name = var.text(),
            ["ENVIRONMENT"] => telemetry.environment = var.text(),
            ["LOGGING", "ENABLED"] => telemetry.logging.enabled = var.flag()?,
            ["LOGGING", "LEVEL"] => telemetry.logging.level = var.text(),
            ["LOGGING", "FORMAT"] => telemetry.logging.format = var.log_format()?,
            ["LOGGING", "INCLUDE_LOCATION"] => telemetry.logging.include_location = var.flag()?,
            ["METRICS", "ENABLED"] => telemetry.metrics.enabled = var.flag()?,
            ["METRICS", "LATENCY_BUCKETS"] => telemetry.metrics.latency_buckets = var.buckets()?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn override_audit(&mut self, field: &str, var: &EnvOverride<'_>) -> Result<bool, ConfigError> {
        let audit = &mut self.config.audit;
        match field {
            "ENABLED" => audit.enabled = var.flag()?,
            "LOG_RECORDS" => audit.log_records = var.flag()?,
            // Empty clears the file output
            "FILE_PATH" => {
                audit.file_path = Some(var.value)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from);
            }
            "RECORD_DENIALS" => audit.record_denials = var.flag()?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::unsupported_format(name)),
        }
    }

    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| Self::from_name(e).ok())
            .ok_or_else(|| ConfigError::unsupported_format(path.display().to_string()))
    }

    fn parse(self, content: &str) -> Result<MinistryConfig, ConfigError> {
        Ok(match self {
            Self::Toml => toml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        })
    }
}

struct EnvOverride<'a> {
    key: &'a str,
    value: &'a str,
}

impl EnvOverride<'_> {
    fn text(&self) -> String {
        self.value.to_string()
    }

    fn flag(&self) -> Result<bool, ConfigError> {
        parse_bool(self.value).ok_or_else(|| ConfigError::env_var(self.key, "expected boolean"))
    }

    fn log_format(&self) -> Result<LogFormat, ConfigError> {
        match self.value.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(ConfigError::env_var(self.key, "expected 'json' or 'pretty'")),
        }
    }

    fn buckets(&self) -> Result<Vec<f64>, ConfigError> {
        self.value
            .split(',')
            .map(|b| b.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| ConfigError::env_var(self.key, "expected comma-separated seconds"))
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Overrides go through apply_override directly so the process
    // environment is never touched.
    fn set(loader: &mut ConfigLoader, var: &str, value: &str) -> Result<(), ConfigError> {
        loader.apply_override(&format!("TEST__{var}"), value, "TEST")
    }

    #[test]
    fn test_new_loads_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, MinistryConfig::default());
    }

    #[test]
    fn test_presets() {
        let dev = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(dev.telemetry.logging.format, LogFormat::Pretty);

        let prod = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(prod.telemetry.logging.format, LogFormat::Json);
        assert_eq!(prod.telemetry.environment, "production");

        let reset = ConfigLoader::new().with_production().with_defaults().load().unwrap();
        assert_eq!(reset, MinistryConfig::default());
    }

    #[test]
    fn test_string_sources() {
        let config = ConfigLoader::new()
            .with_string("[authorization]\nrequired_permission = \"archive:read\"", "TOML")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.authorization.required_permission, "archive:read");
        assert!(config.audit.enabled);

        let config = ConfigLoader::new()
            .with_string(r#"{"audit": {"enabled": false}}"#, "json")
            .unwrap()
            .load()
            .unwrap();
        assert!(!config.audit.enabled);

        let result = ConfigLoader::new().with_string("audit: {}", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_files() {
        let result = ConfigLoader::new().with_file("/nonexistent/ministry.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));

        let loader = ConfigLoader::new()
            .with_optional_file("/nonexistent/ministry.toml")
            .unwrap();
        assert!(!loader.file_loaded());
        assert_eq!(loader.load().unwrap(), MinistryConfig::default());
    }

    #[test]
    fn test_load_validates_but_unvalidated_does_not() {
        let toml = "[authorization]\nrequired_permission = \"\"";

        let loader = ConfigLoader::new().with_string(toml, "toml").unwrap();
        assert!(matches!(loader.load(), Err(ConfigError::InvalidValue { .. })));

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load_unvalidated();
        assert!(config.authorization.required_permission.is_empty());
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["true", "TRUE", "1", "yes", "On"] {
            assert_eq!(parse_bool(truthy), Some(true), "{truthy}");
        }
        for falsy in ["false", "False", "0", "no", "off"] {
            assert_eq!(parse_bool(falsy), Some(false), "{falsy}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_audit_overrides() {
        let mut loader = ConfigLoader::new();
        set(&mut loader, "AUDIT__ENABLED", "false").unwrap();
        set(&mut loader, "AUDIT__FILE_PATH", "/tmp/audit.jsonl").unwrap();
        set(&mut loader, "AUDIT__RECORD_DENIALS", "off").unwrap();

        assert!(!loader.config.audit.enabled);
        assert!(!loader.config.audit.record_denials);
        assert_eq!(
            loader.config.audit.file_path,
            Some(PathBuf::from("/tmp/audit.jsonl"))
        );

        set(&mut loader, "AUDIT__FILE_PATH", "").unwrap();
        assert!(loader.config.audit.file_path.is_none());
    }

    #[test]
    fn test_telemetry_overrides() {
        let mut loader = ConfigLoader::new();
        set(&mut loader, "TELEMETRY__SERVICE_NAME", "wizengamot").unwrap();
        set(&mut loader, "TELEMETRY__LOGGING__LEVEL", "debug").unwrap();
        set(&mut loader, "TELEMETRY__LOGGING__FORMAT", "pretty").unwrap();
        set(&mut loader, "TELEMETRY__METRICS__LATENCY_BUCKETS", "0.01, 0.1,1").unwrap();

        let telemetry = &loader.config.telemetry;
        assert_eq!(telemetry.service_name, "wizengamot");
        assert_eq!(telemetry.logging.level, "debug");
        assert_eq!(telemetry.logging.format, LogFormat::Pretty);
        assert_eq!(telemetry.metrics.latency_buckets, vec![0.01, 0.1, 1.0]);
    }

    #[test]
    fn test_required_permission_override() {
        let mut loader = ConfigLoader::new();
        set(&mut loader, "AUTHORIZATION__REQUIRED_PERMISSION", "spell:read").unwrap();
        assert_eq!(loader.config.authorization.required_permission, "spell:read");
    }

    #[test]
    fn test_malformed_overrides() {
        let mut loader = ConfigLoader::new();
        for (var, value) in [
            ("AUDIT__ENABLED", "sometimes"),
            ("TELEMETRY__LOGGING__FORMAT", "xml"),
            ("TELEMETRY__METRICS__LATENCY_BUCKETS", "fast"),
        ] {
            let result = set(&mut loader, var, value);
            assert!(matches!(result, Err(ConfigError::EnvVar { .. })), "{var}");
        }
    }

    #[test]
    fn test_unknown_override_ignored() {
        let mut loader = ConfigLoader::new();
        set(&mut loader, "SERVER__HTTP_ADDR", "0.0.0.0:80").unwrap();
        set(&mut loader, "AUDIT__ROTATE", "daily").unwrap();
        set(&mut loader, "TELEMETRY__TRACING__ENABLED", "true").unwrap();
        assert_eq!(loader.config, MinistryConfig::default());
    }

    #[test]
    fn test_complete_toml_config() {
        let toml = r#"
            [telemetry]
            service_name = "ministry-of-magic"
            environment = "staging"

            [telemetry.logging]
            enabled = true
            level = "info,ministry::audit=warn"
            format = "json"
            include_location = false

            [telemetry.metrics]
            enabled = true
            latency_buckets = [0.001, 0.01, 0.1, 1.0]

            [authorization]
            required_permission = "spell:cast"

            [authorization.roles]
            Auror = ["spell:cast", "archive:read"]
            Funcionario = ["spell:read", "log:read"]

            [audit]
            enabled = true
            log_records = true
            file_path = "/var/log/ministry/audit.jsonl"
            record_denials = true
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.telemetry.service_name, "ministry-of-magic");
        assert_eq!(config.telemetry.metrics.latency_buckets.len(), 4);
        assert_eq!(config.authorization.roles.as_ref().unwrap().len(), 2);
        assert_eq!(
            config.audit.file_path,
            Some(PathBuf::from("/var/log/ministry/audit.jsonl"))
        );

        let model = config.permission_model().unwrap();
        assert!(model.has_permission("Auror", "spell:cast"));
    }
}
