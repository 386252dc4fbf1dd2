//! Subscriber installation for the route layer's `tracing` events.
//!
//! Production output is one JSON object per event; development output is the
//! multi-line pretty format. Filtering goes through an [`EnvFilter`] so a
//! directive such as `restfluent_dispatch=debug,warn` works as the level.
//!
//! ```rust,ignore
//! use restfluent_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(count = 12, "routes registered with host");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// How events are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Options for [`init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Install nothing when false.
    pub enabled: bool,

    /// Level or `EnvFilter` directive.
    pub level: String,

    /// Rendering of each event.
    pub output: LogOutput,

    /// ANSI colors; ignored for JSON.
    pub ansi: bool,

    /// Emit span open/close events.
    pub spans: bool,

    /// Record source file and line.
    pub source_location: bool,

    /// Record the event target.
    pub target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Pretty, colored, debug-level output with spans and source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".into(),
            output: LogOutput::Pretty,
            ansi: true,
            spans: true,
            source_location: true,
            target: true,
        }
    }

    /// JSON output at info level.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".into(),
            output: LogOutput::Json,
            ansi: false,
            spans: false,
            source_location: false,
            target: true,
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Disabled configs install nothing and succeed.
///
/// # Errors
///
/// [`TelemetryError::InvalidConfig`] for an unparsable level and
/// [`TelemetryError::LoggingInit`] when a global subscriber already exists.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;
    let base = tracing_subscriber::fmt::layer()
        .with_span_events(config.span_events())
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_target(config.target);

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.output {
        LogOutput::Json => base.json().with_filter(filter).boxed(),
        LogOutput::Pretty => base.pretty().with_ansi(config.ansi).with_filter(filter).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parses a level or directive list into an [`EnvFilter`].
///
/// # Errors
///
/// [`TelemetryError::InvalidConfig`] if the directive does not parse.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| {
        TelemetryError::InvalidConfig(format!("invalid log level `{directive}`: {e}"))
    })
}
