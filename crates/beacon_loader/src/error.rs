//! Error types for resource loading.

use crate::cache::ResourceKey;

/// A load attempt did not succeed.
///
/// This never reaches the consumer as a value: the loader logs it, releases
/// the claim, detaches the resource and reports `errored = true`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadFailure {
    /// The environment reported that the resource failed to load.
    #[error("failed to load {key}: {reason}")]
    Rejected {
        /// The resource that failed.
        key: ResourceKey,
        /// Environment-provided description.
        reason: String,
    },

    /// The environment dropped the attachment without reporting an outcome.
    #[error("load of {key} was abandoned before completing")]
    Abandoned {
        /// The resource that was abandoned.
        key: ResourceKey,
    },
}

impl LoadFailure {
    /// Returns the key of the resource that failed.
    #[must_use]
    pub fn key(&self) -> &ResourceKey {
        match self {
            Self::Rejected { key, .. } | Self::Abandoned { key } => key,
        }
    }
}
