//! Build metadata.

/// Version and build-mode information for the running binary.
///
/// # Fields
///
/// - `version` - The crate version from `Cargo.toml`
/// - `debug` - Whether this is a debug build
///
/// # Example
///
/// ```
/// use beacon_core::BuildInfo;
///
/// let info = BuildInfo::default();
/// assert!(!info.version.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    /// Version string.
    pub version: &'static str,
    /// Whether running a debug build.
    pub debug: bool,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            debug: cfg!(debug_assertions),
        }
    }
}
