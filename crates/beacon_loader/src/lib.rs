//! Shared, de-duplicating loader for external resources.
//!
//! Any number of independent consumers may ask for the same resource. The
//! first one to claim a [`ResourceKey`] in the shared [`ResourceLoadCache`]
//! attaches it to the [`ResourceEnvironment`]; every later claimant is told
//! the resource is already present and settles immediately.
//!
//! - [`ResourceLoadCache`] - Registry of keys currently loading or loaded
//! - [`ResourceLoader`] - Per-consumer state machine exposing a [`LoadState`]
//! - [`ResourceEnvironment`] - Where resources are attached and detached
//! - [`ManualEnvironment`] - Host-driven environment, also used in tests
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use beacon_loader::{Activation, LoadState, ManualEnvironment, ResourceLoadCache, ResourceLoader};
//!
//! # tokio_test_block_on(async {
//! let cache = ResourceLoadCache::new();
//! let env = Arc::new(ManualEnvironment::new());
//!
//! let mut first = ResourceLoader::mount(cache.clone(), env.clone(), "a.js", Activation::Active);
//! let second = ResourceLoader::mount(cache.clone(), env.clone(), "a.js", Activation::Active);
//!
//! // Only the first claimant attached the script.
//! assert_eq!(env.attach_count("a.js"), 1);
//! assert_eq!(second.state(), LoadState::ALREADY_PRESENT);
//!
//! env.succeed("a.js");
//! assert_eq!(first.settled().await, LoadState::LOADED);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! # Claim semantics
//!
//! The cache tracks presence only. A consumer that claims a key after the
//! first claimant, but before that load completes, is reported as
//! [`LoadState::ALREADY_PRESENT`] even though the resource may still be in
//! flight. A failed load releases the key so a later consumer can retry.

mod cache;
mod environment;
mod error;
mod loader;
mod state;

pub use cache::{Claim, ResourceKey, ResourceLoadCache};
pub use environment::{
    Attachment, AttachmentId, LoadOutcome, ManualEnvironment, ResourceEnvironment,
};
pub use error::LoadFailure;
pub use loader::{Activation, ResourceLoader};
pub use state::LoadState;
