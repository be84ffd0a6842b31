//! # Beacon Internal Library
//!
//! Re-exports the Beacon crates for convenience.

/// Logging setup and build metadata.
pub use beacon_core;

/// Shared, de-duplicated resource loading.
pub use beacon_loader;

/// Screen context resolution over a document tree.
pub use beacon_screen;

/// Page-view tracking built on the two above.
pub use beacon_tracker;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use beacon_core::{TracingFormat, TracingSetup};
    pub use beacon_loader::{
        Activation, LoadFailure, LoadState, ManualEnvironment, ResourceEnvironment,
        ResourceKey, ResourceLoadCache, ResourceLoader,
    };
    pub use beacon_screen::{DocumentTree, MemoryDocument, ScreenContextResolver, ScreenMarkers};
    pub use beacon_tracker::{
        DataLayer, RenderTarget, TagCommand, TagSink, Tracker, TrackerBuilder, TrackerConfig,
        TrackerView,
    };
}
