//! Configuration section types.
//!
//! Each section deserializes with `deny_unknown_fields` and fills missing
//! keys from its `Default`.

use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use restfluent_middleware::stages::rate_limit::{DEFAULT_KEY_PREFIX, DEFAULT_LIMIT, DEFAULT_WINDOW};
use restfluent_middleware::{CounterStore, RateLimitPolicy};
use restfluent_router::{RouteDefaults, DEFAULT_CONTENT_TYPE, DEFAULT_PREFIX};
use restfluent_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Defaults applied to every newly declared route.
///
/// # Example
///
/// ```
/// use restfluent_config::RoutesSection;
///
/// let routes = RoutesSection::default();
/// assert_eq!(routes.prefix, "v1");
/// assert_eq!(routes.default_status, 200);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct RoutesSection {
    /// Namespace prefix.
    pub prefix: String,

    /// `Content-Type` set when a response carries none.
    pub content_type: String,

    /// Status used when a handler result names none.
    pub default_status: u16,

    /// Whether routes start with envelope wrapping on.
    pub envelope: bool,
}

impl Default for RoutesSection {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            default_status: 200,
            envelope: false,
        }
    }
}

impl RoutesSection {
    /// Converts the section into registry defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `default_status` is not a
    /// valid HTTP status.
    pub fn to_route_defaults(&self) -> Result<RouteDefaults, ConfigError> {
        let default_status = StatusCode::from_u16(self.default_status).map_err(|_| {
            ConfigError::invalid_value(
                "routes.default_status",
                format!("{} is not an HTTP status", self.default_status),
            )
        })?;

        Ok(RouteDefaults {
            prefix: self.prefix.clone(),
            content_type: self.content_type.clone(),
            default_status,
            envelope: self.envelope,
        })
    }
}

/// Longest accepted rate limit window: one year.
pub const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// Settings for the built-in rate limiting middleware.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct RateLimitSection {
    /// Requests allowed per window.
    pub requests: u64,

    /// Window length in seconds, at most [`MAX_WINDOW_SECS`].
    pub window_secs: u64,

    /// Prefix for counter keys.
    pub key_prefix: String,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            requests: DEFAULT_LIMIT,
            window_secs: DEFAULT_WINDOW.as_secs(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl RateLimitSection {
    /// Returns the window as a [`Duration`].
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Builds a rate limit policy backed by `store`.
    pub fn to_policy(&self, store: Arc<dyn CounterStore>) -> RateLimitPolicy {
        RateLimitPolicy::builder(store)
            .limit(self.requests)
            .window(self.window())
            .key_prefix(self.key_prefix.clone())
            .build()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    #[default]
    Json,
    /// Human-readable output.
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(ConfigError::invalid_value(
                "logging.format",
                format!("unknown format '{other}', expected json or pretty"),
            )),
        }
    }
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingSection {
    /// Enable logging.
    pub enabled: bool,

    /// Level or `EnvFilter` directive.
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Emit ANSI colors (pretty format only).
    pub ansi_enabled: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            ansi_enabled: false,
        }
    }
}

impl LoggingSection {
    /// Converts the section into a subscriber configuration.
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };

        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            ansi: self.ansi_enabled,
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restfluent_middleware::InMemoryCounterStore;

    #[test]
    fn test_routes_defaults_match_registry() {
        let defaults = RoutesSection::default().to_route_defaults().unwrap();
        assert_eq!(defaults, RouteDefaults::default());
    }

    #[test]
    fn test_routes_invalid_status() {
        let section = RoutesSection {
            default_status: 1000,
            ..RoutesSection::default()
        };
        assert!(matches!(
            section.to_route_defaults(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_rate_limit_policy() {
        let section = RateLimitSection {
            requests: 5,
            window_secs: 120,
            key_prefix: "rl_".to_string(),
        };
        let policy = section.to_policy(Arc::new(InMemoryCounterStore::new()));
        assert_eq!(policy.limit(), 5);
        assert_eq!(policy.window(), Duration::from_secs(120));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_pretty_log_config() {
        let section = LoggingSection {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            ansi_enabled: true,
            ..LoggingSection::default()
        };
        let config = section.to_log_config();
        assert_eq!(config.output, restfluent_telemetry::LogOutput::Pretty);
        assert!(config.ansi);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_section_rejects_unknown_keys() {
        let result: Result<RateLimitSection, _> = toml::from_str("requests = 1\nburst = 4");
        assert!(result.is_err());
    }
}
