//! Per-consumer load state.

/// Observable progress of one [`ResourceLoader`](crate::ResourceLoader).
///
/// Only four combinations ever occur:
///
/// | `loaded` | `errored` | `was_already_present` | Meaning |
/// |----------|-----------|-----------------------|---------|
/// | `false` | `false` | `false` | [`PENDING`](Self::PENDING) |
/// | `true` | `false` | `false` | [`LOADED`](Self::LOADED) |
/// | `true` | `true` | `false` | [`ERRORED`](Self::ERRORED) |
/// | `true` | `false` | `true` | [`ALREADY_PRESENT`](Self::ALREADY_PRESENT) |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LoadState {
    /// The load reached a terminal outcome.
    pub loaded: bool,
    /// The load failed.
    pub errored: bool,
    /// Another consumer had already claimed the resource.
    pub was_already_present: bool,
}

impl LoadState {
    /// Nothing has happened yet, or the loader is inactive.
    pub const PENDING: Self = Self {
        loaded: false,
        errored: false,
        was_already_present: false,
    };

    /// This consumer loaded the resource.
    pub const LOADED: Self = Self {
        loaded: true,
        errored: false,
        was_already_present: false,
    };

    /// This consumer's load failed.
    pub const ERRORED: Self = Self {
        loaded: true,
        errored: true,
        was_already_present: false,
    };

    /// Another consumer had claimed the resource first.
    pub const ALREADY_PRESENT: Self = Self {
        loaded: true,
        errored: false,
        was_already_present: true,
    };

    /// Returns `true` once no further transition can happen.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.loaded
    }

    /// Returns `true` if the resource is usable, whoever loaded it.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.loaded && !self.errored
    }
}
