//! Structural role markers.

use crate::document::DocumentTree;
use serde::{Deserialize, Serialize};

/// An attribute/value pair identifying a node's structural role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMarker {
    /// Attribute carrying the role.
    pub attribute: String,
    /// Value the attribute must equal.
    pub value: String,
}

impl RoleMarker {
    /// Creates a marker matching `attribute="value"`.
    #[must_use]
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Checks whether `node` carries this marker.
    #[must_use]
    pub fn matches<T: DocumentTree + ?Sized>(&self, tree: &T, node: T::Node) -> bool {
        tree.attribute(node, &self.attribute) == Some(self.value.as_str())
    }
}

/// The markers and attributes screen resolution looks for.
///
/// Defaults match the attributes prototype exports put on their nodes. Every
/// field may be overridden from configuration:
///
/// ```
/// use beacon_screen::ScreenMarkers;
///
/// let markers: ScreenMarkers = serde_json::from_str(r#"{
///     "name_attribute": "data-screen"
/// }"#).unwrap();
///
/// assert_eq!(markers.name_attribute, "data-screen");
/// assert_eq!(markers.active_screen_attribute, "data-active-screen-name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenMarkers {
    /// Marks the container holding the visible screen.
    pub navigation: RoleMarker,
    /// Marks a layout whose visible child is chosen at runtime.
    pub responsive_layout: RoleMarker,
    /// Attribute of a responsive layout naming its active screen.
    pub active_screen_attribute: String,
    /// Attribute naming a plain screen.
    pub name_attribute: String,
}

impl Default for ScreenMarkers {
    fn default() -> Self {
        Self {
            navigation: RoleMarker::new("data-framer-component-type", "NavigationContainer"),
            responsive_layout: RoleMarker::new("data-component", "ResponsiveLayout"),
            active_screen_attribute: "data-active-screen-name".to_string(),
            name_attribute: "data-framer-name".to_string(),
        }
    }
}
