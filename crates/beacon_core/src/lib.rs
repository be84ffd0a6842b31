//! Core infrastructure for Beacon.
//!
//! - [`TracingSetup`] - Installs the `tracing` subscriber
//! - [`BuildInfo`] - Version and build-mode metadata
//!
//! # Example
//!
//! ```no_run
//! use beacon_core::{BuildInfo, TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! let config = TracingSetup::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .init();
//!
//! let info = BuildInfo::default();
//! tracing::info!(version = info.version, level = %config.level, "beacon starting");
//! ```

mod build_info;
mod tracing_setup;

pub use build_info::BuildInfo;
pub use tracing_setup::{TracingConfig, TracingFormat, TracingSetup};
