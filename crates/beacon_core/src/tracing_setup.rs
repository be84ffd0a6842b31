//! Tracing subscriber setup.
//!
//! [`TracingSetup`] collects the desired level, format and filter, and
//! [`TracingSetup::init`] installs a `tracing_subscriber` registry. Installing
//! twice is harmless: the second call keeps the first subscriber.
//!
//! # Example
//!
//! ```
//! use beacon_core::{TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! // Development: pretty output with span enter/exit events
//! let dev = TracingSetup::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Pretty)
//!     .with_span_events(true);
//!
//! // Production: JSON for log aggregation
//! let prod = TracingSetup::new()
//!     .with_format(TracingFormat::Json)
//!     .with_env_filter("beacon_loader=info,beacon_tracker=debug");
//! # let _ = (dev, prod);
//! ```

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// The formatting layer, boxed so every format installs through one path.
type OutputLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// The configuration a [`TracingSetup`] was installed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingConfig {
    /// The configured log level.
    pub level: Level,
    /// The configured output format.
    pub format: TracingFormat,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingSetup
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the process-wide `tracing` subscriber.
///
/// # Environment Filter
///
/// `with_env_filter` sets target-specific levels. Without it, `RUST_LOG` is
/// honored when set, otherwise the configured level applies to everything.
///
/// ```
/// use beacon_core::TracingSetup;
///
/// TracingSetup::new()
///     .with_env_filter("beacon_loader=debug,beacon_screen=warn")
/// # ;
/// ```
#[derive(Debug, Clone)]
pub struct TracingSetup {
    /// Maximum log level.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Environment filter (e.g., "`beacon_loader=debug`").
    env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
}

impl Default for TracingSetup {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingSetup {
    /// Creates a `TracingSetup` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom environment filter string.
    ///
    /// Format: `target=level,target=level,...`
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the configuration this setup installs.
    #[must_use]
    pub fn config(&self) -> TracingConfig {
        TracingConfig {
            level: self.level,
            format: self.format,
        }
    }

    /// Installs the subscriber and returns the resulting configuration.
    ///
    /// If another subscriber is already installed it stays in place.
    pub fn init(self) -> TracingConfig {
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let output = tracing_subscriber::fmt::layer().with_span_events(span_events);
        let output: OutputLayer = match self.format {
            TracingFormat::Pretty => output.pretty().boxed(),
            TracingFormat::Compact => output.compact().boxed(),
            TracingFormat::Json => output.json().boxed(),
        };

        let installed = tracing_subscriber::registry()
            .with(self.env_filter())
            .with(output)
            .try_init();
        if let Err(error) = installed {
            tracing::debug!(%error, "keeping existing subscriber");
        }

        tracing::info!(
            level = %self.level,
            format = ?self.format,
            "tracing initialized"
        );
        self.config()
    }

    fn env_filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.level.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_format_default_is_pretty() {
        assert_eq!(TracingFormat::default(), TracingFormat::Pretty);
    }

    #[test]
    fn default_level_is_info() {
        let setup = TracingSetup::default();
        assert_eq!(setup.level, Level::INFO);
        assert!(setup.env_filter.is_none());
        assert!(!setup.span_events);
    }

    #[test]
    fn builder_methods_apply() {
        let setup = TracingSetup::new()
            .with_level(Level::DEBUG)
            .with_format(TracingFormat::Json)
            .with_env_filter("beacon_loader=debug")
            .with_span_events(true);

        assert_eq!(
            setup.config(),
            TracingConfig {
                level: Level::DEBUG,
                format: TracingFormat::Json,
            }
        );
        assert_eq!(setup.env_filter, Some("beacon_loader=debug".to_string()));
        assert!(setup.span_events);
    }

    #[test]
    fn init_twice_is_harmless() {
        let first = TracingSetup::new().with_format(TracingFormat::Compact).init();
        let second = TracingSetup::new().with_level(Level::WARN).init();

        assert_eq!(first.format, TracingFormat::Compact);
        assert_eq!(second.level, Level::WARN);
    }

    #[test]
    fn every_format_installs() {
        for format in [TracingFormat::Pretty, TracingFormat::Compact, TracingFormat::Json] {
            let config = TracingSetup::new()
                .with_format(format)
                .with_span_events(true)
                .init();
            assert_eq!(config.format, format);
        }
    }
}
