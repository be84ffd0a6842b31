//! Per-consumer resource loader.

use crate::cache::{Claim, ResourceKey, ResourceLoadCache};
use crate::environment::{Attachment, ResourceEnvironment};
use crate::state::LoadState;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;

/// Whether a loader may perform side effects.
///
/// Decided by the host for the context the consumer is mounted in; loaders
/// never compute it themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Activation {
    /// The designated loading context. Loads run.
    Active,
    /// Any other context. The loader stays pending and does nothing.
    #[default]
    Inactive,
}

impl Activation {
    /// Returns `true` for [`Activation::Active`].
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<bool> for Activation {
    fn from(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}

/// Drives one consumer's [`LoadState`] to completion.
///
/// On [`load`](Self::load) an active loader claims the key in the shared
/// [`ResourceLoadCache`]:
///
/// - If another consumer holds the claim, the state becomes
///   [`LoadState::ALREADY_PRESENT`] immediately and nothing is attached.
/// - Otherwise the resource is attached in the same call, and a spawned task
///   waits for the environment's outcome. Success yields
///   [`LoadState::LOADED`]; failure releases the claim, detaches the
///   resource and yields [`LoadState::ERRORED`].
///
/// The completion task is independent of the loader. Dropping the loader, or
/// switching it to another key, only stops this consumer from observing the
/// outcome; a failure is still released and detached.
///
/// # Panics
///
/// Loading as the first claimant spawns onto the current Tokio runtime and
/// panics when called outside one.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use beacon_loader::{Activation, LoadState, ManualEnvironment, ResourceLoadCache, ResourceLoader};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let cache = ResourceLoadCache::new();
/// let env = Arc::new(ManualEnvironment::new());
/// let mut loader = ResourceLoader::mount(cache.clone(), env.clone(), "c.js", Activation::Active);
///
/// env.fail("c.js", "404");
///
/// assert_eq!(loader.settled().await, LoadState::ERRORED);
/// assert!(!cache.contains("c.js"));
/// # });
/// ```
pub struct ResourceLoader<E: ResourceEnvironment> {
    cache: ResourceLoadCache,
    environment: Arc<E>,
    activation: Activation,
    key: Option<ResourceKey>,
    state: watch::Receiver<LoadState>,
    // Held while no completion task owns the sender, so the channel stays open.
    held: Option<watch::Sender<LoadState>>,
}

impl<E: ResourceEnvironment> core::fmt::Debug for ResourceLoader<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResourceLoader")
            .field("activation", &self.activation)
            .field("key", &self.key)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<E: ResourceEnvironment> ResourceLoader<E> {
    /// Creates a pending loader with no key.
    #[must_use]
    pub fn new(cache: ResourceLoadCache, environment: Arc<E>, activation: Activation) -> Self {
        let (tx, rx) = watch::channel(LoadState::PENDING);
        Self {
            cache,
            environment,
            activation,
            key: None,
            state: rx,
            held: Some(tx),
        }
    }

    /// Creates a loader and immediately loads `key`.
    #[must_use]
    pub fn mount(
        cache: ResourceLoadCache,
        environment: Arc<E>,
        key: impl Into<ResourceKey>,
        activation: Activation,
    ) -> Self {
        let mut loader = Self::new(cache, environment, activation);
        loader.load(key);
        loader
    }

    /// Loads `key`.
    ///
    /// Calling again with the same key does nothing. A different key
    /// discards the current state and starts over.
    pub fn load(&mut self, key: impl Into<ResourceKey>) {
        let key = key.into();
        if self.key.as_ref() == Some(&key) {
            return;
        }
        self.key = Some(key);
        self.restart();
    }

    /// Changes the activation, restarting the current key if it differs.
    pub fn set_activation(&mut self, activation: Activation) {
        if self.activation == activation {
            return;
        }
        self.activation = activation;
        self.restart();
    }

    /// Returns the key being loaded, if any.
    #[must_use]
    pub fn key(&self) -> Option<&ResourceKey> {
        self.key.as_ref()
    }

    /// Returns the activation this loader runs under.
    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        *self.state.borrow()
    }

    /// Returns a receiver for state changes of the current key.
    ///
    /// Receivers obtained before a key or activation change keep observing
    /// the previous attempt.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.clone()
    }

    /// Waits for a terminal state.
    ///
    /// Returns the current state right away when it is already terminal, or
    /// when the loader is inactive or has no key, since it will never move.
    pub async fn settled(&mut self) -> LoadState {
        let current = self.state();
        if current.is_terminal() || !self.activation.is_active() || self.key.is_none() {
            return current;
        }

        let settled = self
            .state
            .wait_for(LoadState::is_terminal)
            .await
            .map(|state| *state);
        settled.unwrap_or_else(|_| self.state())
    }

    fn restart(&mut self) {
        let (tx, rx) = watch::channel(LoadState::PENDING);
        self.state = rx;
        self.held = Some(tx);

        let Some(key) = self.key.clone() else {
            return;
        };
        if !self.activation.is_active() {
            tracing::trace!(key = %key, "loader inactive, skipping load");
            return;
        }

        match self.cache.try_claim(&key) {
            Claim::AlreadyClaimed => {
                tracing::debug!(key = %key, "resource already claimed");
                if let Some(tx) = &self.held {
                    tx.send_replace(LoadState::ALREADY_PRESENT);
                }
            }
            Claim::First => {
                tracing::debug!(key = %key, "claimed resource, attaching");
                let attachment = self.environment.attach(&key);
                let Some(tx) = self.held.take() else {
                    return;
                };
                let span = tracing::debug_span!("resource_load", key = %key);
                tokio::spawn(
                    complete(
                        key,
                        attachment,
                        self.cache.clone(),
                        Arc::clone(&self.environment),
                        tx,
                    )
                    .instrument(span),
                );
            }
        }
    }
}

/// Waits for one attachment's outcome and publishes it.
async fn complete<E: ResourceEnvironment>(
    key: ResourceKey,
    attachment: Attachment,
    cache: ResourceLoadCache,
    environment: Arc<E>,
    state: watch::Sender<LoadState>,
) {
    let id = attachment.id();
    match attachment.completion(&key).await {
        Ok(()) => {
            tracing::debug!("resource loaded");
            state.send_replace(LoadState::LOADED);
        }
        Err(failure) => {
            tracing::warn!(error = %failure, "resource failed to load, releasing claim");
            cache.release(&key);
            environment.detach(id);
            state.send_replace(LoadState::ERRORED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::ManualEnvironment;

    fn setup() -> (ResourceLoadCache, Arc<ManualEnvironment>) {
        (ResourceLoadCache::new(), Arc::new(ManualEnvironment::new()))
    }

    #[test]
    fn activation_from_bool() {
        assert_eq!(Activation::from(true), Activation::Active);
        assert_eq!(Activation::from(false), Activation::Inactive);
        assert_eq!(Activation::default(), Activation::Inactive);
    }

    #[test]
    fn new_loader_is_pending_without_key() {
        let (cache, env) = setup();
        let loader = ResourceLoader::new(cache, env, Activation::Active);

        assert_eq!(loader.state(), LoadState::PENDING);
        assert!(loader.key().is_none());
    }

    #[tokio::test]
    async fn first_claimant_loads() {
        let (cache, env) = setup();
        let mut loader = ResourceLoader::mount(cache.clone(), env.clone(), "a.js", Activation::Active);

        assert_eq!(loader.state(), LoadState::PENDING);
        assert!(cache.contains("a.js"));

        env.succeed("a.js");

        assert_eq!(loader.settled().await, LoadState::LOADED);
        assert!(cache.contains("a.js"));
        assert!(env.is_attached("a.js"));
    }

    #[tokio::test]
    async fn same_key_is_a_noop() {
        let (cache, env) = setup();
        let mut loader = ResourceLoader::mount(cache, env.clone(), "a.js", Activation::Active);

        loader.load("a.js");

        assert_eq!(env.attach_count("a.js"), 1);
        assert_eq!(loader.state(), LoadState::PENDING);
    }

    #[tokio::test]
    async fn inactive_settles_immediately_as_pending() {
        let (cache, env) = setup();
        let mut loader = ResourceLoader::mount(cache.clone(), env.clone(), "a.js", Activation::Inactive);

        assert_eq!(loader.settled().await, LoadState::PENDING);
        assert!(cache.is_empty());
        assert_eq!(env.attach_count("a.js"), 0);
    }

    #[tokio::test]
    async fn activation_change_restarts_current_key() {
        let (cache, env) = setup();
        let mut loader = ResourceLoader::mount(cache.clone(), env.clone(), "a.js", Activation::Inactive);

        loader.set_activation(Activation::Active);

        assert_eq!(env.attach_count("a.js"), 1);
        env.succeed("a.js");
        assert_eq!(loader.settled().await, LoadState::LOADED);
    }
}
