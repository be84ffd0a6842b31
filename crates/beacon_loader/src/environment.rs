//! The environment resources are attached to.
//!
//! [`ResourceEnvironment`] abstracts "attach a resource, observe its outcome
//! once, detach it". Loaders depend on nothing else, so any transport can sit
//! behind it.
//!
//! [`ManualEnvironment`] is a host-driven implementation: it records every
//! attachment and lets the embedding host (or a test) report outcomes.

use crate::cache::ResourceKey;
use crate::error::LoadFailure;
use hashbrown::HashMap;
use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Outcome reported by the environment for one attachment.
pub type LoadOutcome = Result<(), LoadFailure>;

/// Identifies one attachment within an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentId(u64);

impl AttachmentId {
    /// Wraps a raw environment-assigned id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A resource attached to the environment, with its single-shot completion.
///
/// The completion resolves exactly once. If the environment drops its sender
/// without reporting, the load counts as [`LoadFailure::Abandoned`].
#[derive(Debug)]
pub struct Attachment {
    id: AttachmentId,
    completion: oneshot::Receiver<LoadOutcome>,
}

impl Attachment {
    /// Creates an attachment and the sender the environment completes it with.
    #[must_use]
    pub fn channel(id: AttachmentId) -> (oneshot::Sender<LoadOutcome>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { id, completion: rx })
    }

    /// Returns the attachment id.
    #[must_use]
    pub fn id(&self) -> AttachmentId {
        self.id
    }

    /// Waits for the environment to report the outcome.
    pub async fn completion(self, key: &ResourceKey) -> LoadOutcome {
        match self.completion.await {
            Ok(outcome) => outcome,
            Err(_) => Err(LoadFailure::Abandoned { key: key.clone() }),
        }
    }
}

/// Capability set the loader needs from its host.
///
/// # Example
///
/// ```
/// use beacon_loader::{Attachment, AttachmentId, ResourceEnvironment, ResourceKey};
///
/// /// Reports every resource as loaded the moment it is attached.
/// struct AlwaysLoaded;
///
/// impl ResourceEnvironment for AlwaysLoaded {
///     fn attach(&self, _key: &ResourceKey) -> Attachment {
///         let (tx, attachment) = Attachment::channel(AttachmentId::new(0));
///         let _ = tx.send(Ok(()));
///         attachment
///     }
///
///     fn detach(&self, _id: AttachmentId) {}
/// }
/// ```
pub trait ResourceEnvironment: Send + Sync + 'static {
    /// Attaches the resource and starts loading it.
    fn attach(&self, key: &ResourceKey) -> Attachment;

    /// Removes a previously attached resource.
    fn detach(&self, id: AttachmentId);
}

// ─────────────────────────────────────────────────────────────────────────────
// ManualEnvironment
// ─────────────────────────────────────────────────────────────────────────────

struct Attached {
    id: AttachmentId,
    key: ResourceKey,
    completion: Option<oneshot::Sender<LoadOutcome>>,
}

#[derive(Default)]
struct ManualState {
    next_id: u64,
    // Newest first, like a prepend into a document head.
    head: Vec<Attached>,
    attach_counts: HashMap<ResourceKey, usize>,
    detached: Vec<AttachmentId>,
}

/// Environment whose outcomes are reported by the host.
///
/// # Example
///
/// ```
/// use beacon_loader::{ManualEnvironment, ResourceEnvironment};
///
/// let env = ManualEnvironment::new();
/// let attachment = env.attach(&"gtag.js".into());
///
/// assert_eq!(env.attached_keys(), vec!["gtag.js".into()]);
/// assert_eq!(env.pending_count(), 1);
///
/// env.fail("gtag.js", "404");
/// assert_eq!(env.pending_count(), 0);
/// # drop(attachment);
/// ```
#[derive(Default)]
pub struct ManualEnvironment {
    state: Mutex<ManualState>,
}

impl core::fmt::Debug for ManualEnvironment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ManualEnvironment")
            .field("attached", &self.attached_keys())
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl ManualEnvironment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports that the oldest pending attachment of `key` loaded.
    ///
    /// Returns `true` if an attachment was waiting for an outcome and its
    /// loader was still listening.
    pub fn succeed(&self, key: impl AsRef<str>) -> bool {
        self.complete(key.as_ref(), |_| Ok(()))
    }

    /// Reports that the oldest pending attachment of `key` failed.
    pub fn fail(&self, key: impl AsRef<str>, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        self.complete(key.as_ref(), |key| {
            Err(LoadFailure::Rejected {
                key: key.clone(),
                reason,
            })
        })
    }

    /// Drops the oldest pending attachment of `key` without an outcome.
    pub fn abandon(&self, key: impl AsRef<str>) -> bool {
        self.take_pending(key.as_ref()).is_some()
    }

    /// Returns how many times `key` was ever attached.
    #[must_use]
    pub fn attach_count(&self, key: impl AsRef<str>) -> usize {
        self.state
            .lock()
            .attach_counts
            .get(key.as_ref())
            .copied()
            .unwrap_or(0)
    }

    /// Returns the keys currently attached, newest first.
    #[must_use]
    pub fn attached_keys(&self) -> Vec<ResourceKey> {
        self.state
            .lock()
            .head
            .iter()
            .map(|attached| attached.key.clone())
            .collect()
    }

    /// Checks whether `key` is currently attached.
    #[must_use]
    pub fn is_attached(&self, key: impl AsRef<str>) -> bool {
        let key = key.as_ref();
        self.state
            .lock()
            .head
            .iter()
            .any(|attached| attached.key.as_str() == key)
    }

    /// Returns the number of attachments still waiting for an outcome.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state
            .lock()
            .head
            .iter()
            .filter(|attached| attached.completion.is_some())
            .count()
    }

    /// Returns the ids removed through [`ResourceEnvironment::detach`], in order.
    #[must_use]
    pub fn detached(&self) -> Vec<AttachmentId> {
        self.state.lock().detached.clone()
    }

    fn complete(&self, key: &str, outcome: impl FnOnce(&ResourceKey) -> LoadOutcome) -> bool {
        let Some((key, sender)) = self.take_pending(key) else {
            tracing::debug!(key, "no pending attachment to complete");
            return false;
        };
        sender.send(outcome(&key)).is_ok()
    }

    fn take_pending(&self, key: &str) -> Option<(ResourceKey, oneshot::Sender<LoadOutcome>)> {
        let mut state = self.state.lock();
        // The oldest attachment sits at the back of the head.
        state
            .head
            .iter_mut()
            .rev()
            .filter(|attached| attached.key.as_str() == key)
            .find_map(|attached| {
                attached
                    .completion
                    .take()
                    .map(|sender| (attached.key.clone(), sender))
            })
    }
}

impl ResourceEnvironment for ManualEnvironment {
    fn attach(&self, key: &ResourceKey) -> Attachment {
        let mut state = self.state.lock();
        let id = AttachmentId::new(state.next_id);
        state.next_id += 1;

        let (sender, attachment) = Attachment::channel(id);
        state.head.insert(
            0,
            Attached {
                id,
                key: key.clone(),
                completion: Some(sender),
            },
        );
        *state.attach_counts.entry(key.clone()).or_insert(0) += 1;

        tracing::debug!(key = %key, id = id.get(), "resource attached");
        attachment
    }

    fn detach(&self, id: AttachmentId) {
        let mut state = self.state.lock();
        state.head.retain(|attached| attached.id != id);
        state.detached.push(id);
        tracing::debug!(id = id.get(), "resource detached");
    }
}
