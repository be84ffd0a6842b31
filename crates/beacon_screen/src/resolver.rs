//! One-shot screen name resolution.

use crate::document::DocumentTree;
use crate::markers::ScreenMarkers;
use std::sync::OnceLock;

/// Derives the current screen name for the element with id `anchor_id`.
///
/// 1. Find the anchor. 2. Find the nearest navigation container around it.
/// 3. Take the container's first child as the screen candidate. Each missing
///    link yields `None`.
///
/// If the candidate's first child is a responsive layout, that layout's
/// active-screen attribute is the answer, even when absent. Otherwise the
/// candidate's own name attribute is used; an empty name counts as absent.
pub fn resolve_screen_name<T: DocumentTree + ?Sized>(
    tree: &T,
    anchor_id: &str,
    markers: &ScreenMarkers,
) -> Option<String> {
    let anchor = tree.element_by_id(anchor_id)?;
    let container = tree.closest(anchor, &markers.navigation)?;
    let screen = tree.first_child(container)?;

    if let Some(layout) = tree.first_child(screen)
        && markers.responsive_layout.matches(tree, layout)
    {
        return tree
            .attribute(layout, &markers.active_screen_attribute)
            .map(str::to_owned);
    }

    tree.attribute(screen, &markers.name_attribute)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}

/// Resolves a consumer's screen name exactly once.
///
/// The first call to [`resolve`](Self::resolve) walks the tree; every later
/// call returns the same answer, whatever the tree looks like by then.
///
/// # Example
///
/// ```
/// use beacon_screen::{MemoryDocument, ScreenContextResolver};
///
/// let doc = MemoryDocument::from_json(r#"{
///     "attributes": { "data-framer-component-type": "NavigationContainer" },
///     "children": [{
///         "attributes": { "data-framer-name": "Ignored" },
///         "children": [{
///             "attributes": {
///                 "data-component": "ResponsiveLayout",
///                 "data-active-screen-name": "Home",
///                 "id": "anchor"
///             }
///         }]
///     }]
/// }"#).unwrap();
///
/// let resolver = ScreenContextResolver::new("anchor");
/// assert_eq!(resolver.resolve(&doc), Some("Home"));
/// ```
#[derive(Debug)]
pub struct ScreenContextResolver {
    anchor_id: String,
    markers: ScreenMarkers,
    resolved: OnceLock<Option<String>>,
}

impl ScreenContextResolver {
    /// Creates a resolver for the element with id `anchor_id`, using the
    /// default markers.
    #[must_use]
    pub fn new(anchor_id: impl Into<String>) -> Self {
        Self {
            anchor_id: anchor_id.into(),
            markers: ScreenMarkers::default(),
            resolved: OnceLock::new(),
        }
    }

    /// Replaces the markers used for resolution.
    #[must_use]
    pub fn with_markers(mut self, markers: ScreenMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Returns the anchor id.
    #[must_use]
    pub fn anchor_id(&self) -> &str {
        &self.anchor_id
    }

    /// Resolves the screen name on first call and returns the cached value after.
    pub fn resolve<T: DocumentTree + ?Sized>(&self, tree: &T) -> Option<&str> {
        self.resolved
            .get_or_init(|| {
                let name = resolve_screen_name(tree, &self.anchor_id, &self.markers);
                tracing::debug!(anchor = %self.anchor_id, screen = ?name, "resolved screen context");
                name
            })
            .as_deref()
    }

    /// Returns the resolved value, or `None` if [`resolve`](Self::resolve)
    /// has not run yet.
    #[must_use]
    pub fn resolved(&self) -> Option<Option<&str>> {
        self.resolved.get().map(Option::as_deref)
    }
}
