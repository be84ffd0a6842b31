//! Shared script loading and screen-aware page-view tracking for embedded
//! widgets.
//!

pub use beacon_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use beacon_internal::prelude::*;
}
