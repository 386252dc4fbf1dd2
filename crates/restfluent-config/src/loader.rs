//! Layered configuration loading.
//!
//! Layers apply in call order; a file or string layer replaces everything
//! before it, and environment overrides are applied last by [`ConfigLoader::load`].

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::{ConfigError, LogFormat, RestfluentConfig};

/// Environment prefix used by [`ConfigLoader::with_default_env`].
pub const DEFAULT_ENV_PREFIX: &str = "RESTFLUENT";

/// Builds a [`RestfluentConfig`] from defaults, files and environment variables.
///
/// # Example
///
/// ```no_run
/// use restfluent_config::ConfigLoader;
///
/// # fn main() -> Result<(), restfluent_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("restfluent.toml")?
///     .with_env_prefix("RESTFLUENT")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: RestfluentConfig,
    env_prefix: Option<String>,
    file_loaded: bool,
}

impl ConfigLoader {
    /// Creates a loader holding the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to the default configuration.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = RestfluentConfig::default();
        self
    }

    /// Starts from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = RestfluentConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = RestfluentConfig::production();
        self
    }

    /// Loads a TOML or JSON file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, has an unknown extension or
    /// does not parse (unknown keys included).
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        self.config = parse(&content, format)?;
        self.file_loaded = true;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in `toml` or `json` format.
    ///
    /// # Errors
    ///
    /// Fails on an unknown format or a parse error.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Enables `PREFIX__SECTION__KEY` environment overrides.
    ///
    /// ```
    /// use restfluent_config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::new().with_env_prefix("restfluent");
    /// assert_eq!(loader.env_prefix(), Some("RESTFLUENT"));
    /// ```
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Enables environment overrides under `RESTFLUENT__`.
    #[must_use]
    pub fn with_default_env(self) -> Self {
        self.with_env_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Loads variables from a `.env` file in the working directory, if any.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        // a missing .env is not an error
        let _ = dotenvy::dotenv();
        self
    }

    /// Returns the configured environment prefix.
    pub fn env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref()
    }

    /// Whether a configuration file has been loaded.
    pub const fn file_loaded(&self) -> bool {
        self.file_loaded
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Fails if an override does not parse or validation fails.
    pub fn load(mut self) -> Result<RestfluentConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.clone() {
            self.apply_env_overrides(&prefix)?;
        }
        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without overrides or validation.
    pub fn load_unvalidated(self) -> RestfluentConfig {
        self.config
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(key, _)| key.starts_with(&marker))
            .collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let path = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = path.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["ROUTES", "PREFIX"] => config.routes.prefix = value.to_string(),
            ["ROUTES", "CONTENT_TYPE"] => config.routes.content_type = value.to_string(),
            ["ROUTES", "DEFAULT_STATUS"] => config.routes.default_status = parse_number(key, value)?,
            ["ROUTES", "ENVELOPE"] => config.routes.envelope = parse_flag(key, value)?,

            ["RATE_LIMIT", "REQUESTS"] => config.rate_limit.requests = parse_number(key, value)?,
            ["RATE_LIMIT", "WINDOW_SECS"] => config.rate_limit.window_secs = parse_number(key, value)?,
            ["RATE_LIMIT", "KEY_PREFIX"] => config.rate_limit.key_prefix = value.to_string(),

            ["LOGGING", "ENABLED"] => config.logging.enabled = parse_flag(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.format = LogFormat::from_str(value)
                    .map_err(|_| ConfigError::env_parse_error(key, "expected json or pretty"))?;
            }
            ["LOGGING", "ANSI_ENABLED"] => config.logging.ansi_enabled = parse_flag(key, value)?,

            _ => {}
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<RestfluentConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loader_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, RestfluentConfig::default());
    }

    #[test]
    fn test_loader_presets() {
        let dev = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(dev.logging.format, LogFormat::Pretty);

        let prod = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(prod.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_toml_string() {
        let toml = r#"
            [routes]
            prefix = "shop/v2"
            envelope = true

            [rate_limit]
            requests = 100
        "#;

        let config = ConfigLoader::new().with_string(toml, "toml").unwrap().load().unwrap();

        assert_eq!(config.routes.prefix, "shop/v2");
        assert!(config.routes.envelope);
        assert_eq!(config.routes.content_type, "application/json");
        assert_eq!(config.rate_limit.requests, 100);
        assert_eq!(config.rate_limit.window_secs, 60);
    }

    #[test]
    fn test_loader_json_string() {
        let json = r#"{"logging": {"level": "warn", "format": "pretty"}}"#;
        let config = ConfigLoader::new().with_string(json, "JSON").unwrap().load().unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_unknown_format() {
        let err = ConfigLoader::new().with_string("", "yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(f) if f == "yaml"));
    }

    #[test]
    fn test_loader_unknown_key() {
        let err = ConfigLoader::new()
            .with_string("[routes]\nversion = 2", "toml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn test_loader_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[rate_limit]\nwindow_secs = 300").unwrap();

        let loader = ConfigLoader::new().with_file(file.path()).unwrap();
        assert!(loader.file_loaded());
        let config = loader.load().unwrap();
        assert_eq!(config.rate_limit.window_secs, 300);
    }

    #[test]
    fn test_loader_file_not_found() {
        let err = ConfigLoader::new()
            .with_file("/nonexistent/restfluent.toml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_loader_optional_file_missing() {
        let loader = ConfigLoader::new()
            .with_optional_file("/nonexistent/restfluent.toml")
            .unwrap();
        assert!(!loader.file_loaded());
        assert_eq!(loader.load().unwrap(), RestfluentConfig::default());
    }

    #[test]
    fn test_loader_validates() {
        let result = ConfigLoader::new()
            .with_string("[rate_limit]\nrequests = 0", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_unvalidated_skips_checks() {
        let config = ConfigLoader::new()
            .with_string("[rate_limit]\nrequests = 0", "toml")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.rate_limit.requests, 0);
    }

    #[test]
    fn test_apply_env_var_sections() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("T__ROUTES__PREFIX", "api", "T").unwrap();
        loader.apply_env_var("T__ROUTES__DEFAULT_STATUS", "201", "T").unwrap();
        loader.apply_env_var("T__RATE_LIMIT__REQUESTS", "10", "T").unwrap();
        loader.apply_env_var("T__LOGGING__FORMAT", "pretty", "T").unwrap();
        loader.apply_env_var("T__LOGGING__ANSI_ENABLED", "on", "T").unwrap();

        let config = loader.load_unvalidated();
        assert_eq!(config.routes.prefix, "api");
        assert_eq!(config.routes.default_status, 201);
        assert_eq!(config.rate_limit.requests, 10);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.ansi_enabled);
    }

    #[test]
    fn test_apply_env_var_parse_errors() {
        let mut loader = ConfigLoader::new();
        assert!(loader.apply_env_var("T__RATE_LIMIT__REQUESTS", "many", "T").is_err());
        assert!(loader.apply_env_var("T__ROUTES__ENVELOPE", "maybe", "T").is_err());
        assert!(loader.apply_env_var("T__LOGGING__FORMAT", "xml", "T").is_err());
    }

    #[test]
    fn test_apply_env_var_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("T__SERVER__PORT", "8080", "T").unwrap();
        assert_eq!(loader.load_unvalidated(), RestfluentConfig::default());
    }

    #[test]
    fn test_env_overrides_applied_on_load() {
        env::set_var("RFCFGTEST__RATE_LIMIT__WINDOW_SECS", "90");
        let config = ConfigLoader::new().with_env_prefix("rfcfgtest").load().unwrap();
        env::remove_var("RFCFGTEST__RATE_LIMIT__WINDOW_SECS");
        assert_eq!(config.rate_limit.window_secs, 90);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("Off"), Some(false));
        assert_eq!(parse_bool(""), None);
    }
}
