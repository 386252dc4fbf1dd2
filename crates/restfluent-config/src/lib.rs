//! Layered configuration for restfluent.
//!
//! [`RestfluentConfig`] holds three sections:
//!
//! - [`RoutesSection`] - defaults for newly declared routes
//! - [`RateLimitSection`] - the built-in rate limiting middleware
//! - [`LoggingSection`] - the `tracing` subscriber
//!
//! [`ConfigLoader`] layers defaults, a TOML or JSON file and
//! `PREFIX__SECTION__KEY` environment variables, then validates. Unknown keys
//! are rejected.
//!
//! # Example
//!
//! ```no_run
//! use restfluent_config::ConfigLoader;
//! use restfluent_router::RouteRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("restfluent.toml")?
//!     .with_default_env()
//!     .load()?;
//!
//! restfluent_telemetry::init_logging(&config.logging.to_log_config())?;
//! let routes = RouteRegistry::with_defaults(config.routes.to_route_defaults()?);
//! # Ok(())
//! # }
//! ```
//!
//! # File format
//!
//! ```toml
//! [routes]
//! prefix = "v1"
//! content_type = "application/json"
//! default_status = 200
//! envelope = false
//!
//! [rate_limit]
//! requests = 60
//! window_secs = 60
//! key_prefix = "rate_limit_"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ansi_enabled = false
//! ```
//!
//! # Environment overrides
//!
//! - `RESTFLUENT__ROUTES__PREFIX=api`
//! - `RESTFLUENT__RATE_LIMIT__REQUESTS=100`
//! - `RESTFLUENT__LOGGING__FORMAT=pretty`

#![doc(html_root_url = "https://docs.rs/restfluent-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::RestfluentConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{LogFormat, LoggingSection, RateLimitSection, RoutesSection, MAX_WINDOW_SECS};
