//! Process-wide registry of claimed resource keys.

use core::borrow::Borrow;
use core::fmt;
use hashbrown::HashSet;
use parking_lot::Mutex;
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// ResourceKey
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque identifier of an external resource, usually a script URL.
///
/// Two keys are the same resource exactly when their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(Arc<str>);

impl ResourceKey {
    /// Creates a key from any string-like value.
    #[must_use]
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ResourceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ResourceKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

impl From<&ResourceKey> for ResourceKey {
    fn from(key: &ResourceKey) -> Self {
        key.clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Claim
// ─────────────────────────────────────────────────────────────────────────────

/// Result of [`ResourceLoadCache::try_claim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The key was absent and is now registered. The caller must load it.
    First,
    /// The key was already registered by another consumer. Do not load.
    AlreadyClaimed,
}

impl Claim {
    /// Returns `true` when another consumer registered the key first.
    #[must_use]
    pub fn is_already_claimed(self) -> bool {
        matches!(self, Self::AlreadyClaimed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ResourceLoadCache
// ─────────────────────────────────────────────────────────────────────────────

/// Set of resource keys currently loading or loaded.
///
/// A key enters the set when its first consumer starts loading it and only
/// leaves it again if that load fails. Presence alone drives de-duplication:
/// there is no distinction between "still loading" and "loaded".
///
/// The cache is a cheap handle; clones share the same underlying set. Create
/// one per hosting process and hand clones to every [`ResourceLoader`].
///
/// [`ResourceLoader`]: crate::ResourceLoader
///
/// # Example
///
/// ```
/// use beacon_loader::{Claim, ResourceLoadCache};
///
/// let cache = ResourceLoadCache::new();
/// assert_eq!(cache.try_claim(&"a.js".into()), Claim::First);
/// assert_eq!(cache.try_claim(&"a.js".into()), Claim::AlreadyClaimed);
///
/// cache.release(&"a.js".into());
/// assert_eq!(cache.try_claim(&"a.js".into()), Claim::First);
/// ```
#[derive(Clone, Default)]
pub struct ResourceLoadCache {
    claimed: Arc<Mutex<HashSet<ResourceKey>>>,
}

impl fmt::Debug for ResourceLoadCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLoadCache")
            .field("claimed", &self.len())
            .finish()
    }
}

impl ResourceLoadCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` if it is absent.
    ///
    /// Check and insert happen under one lock, so exactly one caller ever
    /// observes [`Claim::First`] for a key until it is released.
    pub fn try_claim(&self, key: &ResourceKey) -> Claim {
        let mut claimed = self.claimed.lock();
        if claimed.contains(key) {
            Claim::AlreadyClaimed
        } else {
            claimed.insert(key.clone());
            Claim::First
        }
    }

    /// Removes `key`, re-opening it for a future load attempt.
    ///
    /// Returns `true` if the key was present.
    pub fn release(&self, key: &ResourceKey) -> bool {
        self.claimed.lock().remove(key)
    }

    /// Checks whether `key` is currently claimed.
    #[must_use]
    pub fn contains(&self, key: impl AsRef<str>) -> bool {
        self.claimed.lock().contains(key.as_ref())
    }

    /// Returns the number of claimed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claimed.lock().len()
    }

    /// Returns `true` if no key is claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claimed.lock().is_empty()
    }

    /// Forgets every claim.
    ///
    /// Loads already in flight are unaffected; their completion still runs
    /// against this cache.
    pub fn reset(&self) {
        self.claimed.lock().clear();
    }
}
