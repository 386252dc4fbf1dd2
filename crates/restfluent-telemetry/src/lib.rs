//! Logging and metrics for the restfluent route layer.
//!
//! - **Logging**: `tracing` events from every crate, rendered by a
//!   `tracing-subscriber` registry installed with [`init_logging`]
//! - **Metrics**: counters and histograms recorded through the `metrics`
//!   facade; the embedder installs whichever recorder/exporter it runs
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `restfluent_dispatch_total` | Counter | `route`, `method`, `status` | Completed dispatch runs |
//! | `restfluent_dispatch_duration_seconds` | Histogram | `route`, `method` | Dispatch latency |
//! | `restfluent_rate_limited_total` | Counter | `policy` | Requests rejected with 429 |
//! | `restfluent_middleware_passthrough_total` | Counter | `reference` | Unresolved middleware skipped |
//!
//! # Example
//!
//! ```rust,ignore
//! use restfluent_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(route = "GET v1/users", "declared");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogOutput};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
