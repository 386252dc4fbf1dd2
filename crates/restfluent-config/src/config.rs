//! The root configuration type.

use serde::{Deserialize, Serialize};

use crate::schema::MAX_WINDOW_SECS;
use crate::{ConfigError, LogFormat, LoggingSection, RateLimitSection, RoutesSection};

/// Complete restfluent configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer files and environment
/// variables on top of the defaults.
///
/// # Example
///
/// ```
/// use restfluent_config::RestfluentConfig;
///
/// let config = RestfluentConfig::default();
/// assert_eq!(config.routes.prefix, "v1");
/// assert_eq!(config.rate_limit.requests, 60);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct RestfluentConfig {
    /// Route declaration defaults.
    #[serde(default)]
    pub routes: RoutesSection,

    /// Rate limiting middleware settings.
    #[serde(default)]
    pub rate_limit: RateLimitSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl RestfluentConfig {
    /// Checks value ranges that deserialization cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routes.prefix.trim_matches('/').is_empty() {
            return Err(ConfigError::invalid_value("routes.prefix", "must not be empty"));
        }

        if self.routes.content_type.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "routes.content_type",
                "must not be empty",
            ));
        }

        if !(100..=599).contains(&self.routes.default_status) {
            return Err(ConfigError::invalid_value(
                "routes.default_status",
                format!("{} is outside 100..=599", self.routes.default_status),
            ));
        }

        if self.rate_limit.requests == 0 {
            return Err(ConfigError::invalid_value(
                "rate_limit.requests",
                "must be greater than zero",
            ));
        }

        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::invalid_value(
                "rate_limit.window_secs",
                "must be greater than zero",
            ));
        }

        if self.rate_limit.window_secs > MAX_WINDOW_SECS {
            return Err(ConfigError::invalid_value(
                "rate_limit.window_secs",
                format!("{} exceeds the maximum of {MAX_WINDOW_SECS}", self.rate_limit.window_secs),
            ));
        }

        Ok(())
    }

    /// Local development preset: pretty, colored, debug-level logs.
    ///
    /// # Example
    ///
    /// ```
    /// use restfluent_config::{LogFormat, RestfluentConfig};
    ///
    /// let config = RestfluentConfig::development();
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingSection {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                ansi_enabled: true,
                ..LoggingSection::default()
            },
            ..Self::default()
        }
    }

    /// Production preset: JSON logs at info level.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}
