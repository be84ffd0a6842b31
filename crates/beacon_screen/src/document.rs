//! Document tree queries and an in-memory implementation.

use crate::markers::RoleMarker;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query primitives screen resolution depends on.
///
/// Implement this over whatever document representation the host has. Only
/// element nodes are visible through it.
pub trait DocumentTree {
    /// Handle to an element.
    type Node: Copy;

    /// Finds the element with the given `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Returns the nearest element, starting with `node` itself and moving
    /// up through its ancestors, that carries `marker`.
    fn closest(&self, node: Self::Node, marker: &RoleMarker) -> Option<Self::Node>;

    /// Returns the first element child of `node`.
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;

    /// Reads an attribute of `node`.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;
}

/// Index of an element in a [`MemoryDocument`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Errors building a [`MemoryDocument`].
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The node does not belong to this document.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// The child already has a parent.
    #[error("node {0:?} already has a parent")]
    AlreadyAttached(NodeId),

    /// Appending would make a node its own ancestor.
    #[error("appending {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Prospective parent.
        parent: NodeId,
        /// Prospective child.
        child: NodeId,
    },

    /// A JSON fixture could not be parsed.
    #[error("invalid fixture: {0}")]
    Fixture(#[from] serde_json::Error),
}

/// Serializable description of an element and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementFixture {
    /// Attributes of the element.
    pub attributes: BTreeMap<String, String>,
    /// Element children, in order.
    pub children: Vec<ElementFixture>,
}

#[derive(Debug, Default)]
struct Element {
    attributes: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed element tree.
///
/// # Example
///
/// ```
/// use beacon_screen::{DocumentTree, MemoryDocument};
///
/// let mut doc = MemoryDocument::new();
/// let screen = doc.create_element();
/// let anchor = doc.create_element();
/// doc.append_child(screen, anchor).unwrap();
/// doc.set_attribute(anchor, "id", "tracker").unwrap();
///
/// assert_eq!(doc.element_by_id("tracker"), Some(anchor));
/// assert_eq!(doc.first_child(screen), Some(anchor));
/// ```
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: Vec<Element>,
    ids: HashMap<String, Vec<NodeId>>,
}

impl MemoryDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from a fixture; its root becomes `NodeId` index 0.
    #[must_use]
    pub fn from_fixture(fixture: &ElementFixture) -> Self {
        let mut doc = Self::new();
        doc.insert_fixture(fixture, None);
        doc
    }

    /// Parses a JSON [`ElementFixture`] into a document.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        let fixture: ElementFixture = serde_json::from_str(json)?;
        Ok(Self::from_fixture(&fixture))
    }

    /// Returns the first root element, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.elements
            .iter()
            .position(|element| element.parent.is_none())
            .map(NodeId)
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Adds a detached element.
    pub fn create_element(&mut self) -> NodeId {
        let id = NodeId(self.elements.len());
        self.elements.push(Element::default());
        id
    }

    /// Sets an attribute, replacing any previous value.
    ///
    /// Setting `id` also indexes the element for [`DocumentTree::element_by_id`].
    /// When several elements share an id, the first in document order wins.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), TreeError> {
        self.check(node)?;
        self.set_attribute_unchecked(node, name.into(), value.into());
        Ok(())
    }

    /// Appends `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check(parent)?;
        self.check(child)?;
        if self.elements[child.0].parent.is_some() {
            return Err(TreeError::AlreadyAttached(child));
        }

        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(TreeError::Cycle { parent, child });
            }
            cursor = self.elements[node.0].parent;
        }

        self.elements[child.0].parent = Some(parent);
        self.elements[parent.0].children.push(child);
        Ok(())
    }

    /// Returns the parent of `node`.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.elements.get(node.0).and_then(|element| element.parent)
    }

    /// Returns the children of `node`, in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.elements
            .get(node.0)
            .map(|element| element.children.as_slice())
            .unwrap_or_default()
    }

    /// `node` must belong to this document.
    fn set_attribute_unchecked(&mut self, node: NodeId, name: String, value: String) {
        let attributes = &mut self.elements[node.0].attributes;
        let previous = match attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => Some(core::mem::replace(slot, value.clone())),
            None => {
                attributes.push((name.clone(), value.clone()));
                None
            }
        };

        if name != "id" {
            return;
        }
        if let Some(previous) = previous {
            if previous == value {
                return;
            }
            if let Some(holders) = self.ids.get_mut(&previous) {
                holders.retain(|holder| *holder != node);
                if holders.is_empty() {
                    self.ids.remove(&previous);
                }
            }
        }
        self.ids.entry(value).or_default().push(node);
    }

    /// Sort key placing nodes in document order: the root's arena index,
    /// then the child index at every level below it.
    fn document_position(&self, node: NodeId) -> Vec<usize> {
        let mut position = Vec::new();
        let mut cursor = node;
        while let Some(parent) = self.elements[cursor.0].parent {
            let index = self.elements[parent.0]
                .children
                .iter()
                .position(|child| *child == cursor)
                .unwrap_or_default();
            position.push(index);
            cursor = parent;
        }
        position.push(cursor.0);
        position.reverse();
        position
    }

    fn check(&self, node: NodeId) -> Result<(), TreeError> {
        if node.0 < self.elements.len() {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(node))
        }
    }

    fn insert_fixture(&mut self, fixture: &ElementFixture, parent: Option<NodeId>) -> NodeId {
        let node = self.create_element();
        if let Some(parent) = parent {
            self.elements[node.0].parent = Some(parent);
            self.elements[parent.0].children.push(node);
        }
        for (name, value) in &fixture.attributes {
            self.set_attribute_unchecked(node, name.clone(), value.clone());
        }
        for child in &fixture.children {
            self.insert_fixture(child, Some(node));
        }
        node
    }
}

impl DocumentTree for MemoryDocument {
    type Node = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids
            .get(id)?
            .iter()
            .copied()
            .min_by_key(|node| self.document_position(*node))
    }

    fn closest(&self, node: NodeId, marker: &RoleMarker) -> Option<NodeId> {
        let mut cursor = Some(node).filter(|node| node.0 < self.elements.len());
        while let Some(current) = cursor {
            if marker.matches(self, current) {
                return Some(current);
            }
            cursor = self.elements[current.0].parent;
        }
        None
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.elements.get(node.0).and_then(|element| {
            element
                .attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: usize) -> (MemoryDocument, Vec<NodeId>) {
        let mut doc = MemoryDocument::new();
        let nodes: Vec<_> = (0..len).map(|_| doc.create_element()).collect();
        for pair in nodes.windows(2) {
            doc.append_child(pair[0], pair[1]).unwrap();
        }
        (doc, nodes)
    }

    #[test]
    fn append_rejects_second_parent() {
        let (mut doc, nodes) = chain(2);
        let other = doc.create_element();

        let result = doc.append_child(other, nodes[1]);
        assert!(matches!(result, Err(TreeError::AlreadyAttached(_))));
    }

    #[test]
    fn append_rejects_cycles() {
        let (mut doc, nodes) = chain(3);
        let result = doc.append_child(nodes[2], nodes[0]);
        assert!(matches!(result, Err(TreeError::Cycle { .. })));

        let lone = doc.create_element();
        let result = doc.append_child(lone, lone);
        assert!(matches!(result, Err(TreeError::Cycle { .. })));
    }

    #[test]
    fn unknown_nodes_are_rejected() {
        let mut doc = MemoryDocument::new();
        let ghost = NodeId(7);

        assert!(matches!(
            doc.set_attribute(ghost, "id", "x"),
            Err(TreeError::UnknownNode(_))
        ));
        assert!(doc.first_child(ghost).is_none());
        assert!(doc.attribute(ghost, "id").is_none());
        assert!(doc.closest(ghost, &RoleMarker::new("a", "b")).is_none());
    }

    #[test]
    fn first_id_wins() {
        let mut doc = MemoryDocument::new();
        let a = doc.create_element();
        let b = doc.create_element();
        doc.set_attribute(a, "id", "dup").unwrap();
        doc.set_attribute(b, "id", "dup").unwrap();

        assert_eq!(doc.element_by_id("dup"), Some(a));
    }

    #[test]
    fn shared_id_survives_rename() {
        let mut doc = MemoryDocument::new();
        let a = doc.create_element();
        let b = doc.create_element();
        doc.set_attribute(a, "id", "dup").unwrap();
        doc.set_attribute(b, "id", "dup").unwrap();

        doc.set_attribute(a, "id", "other").unwrap();

        assert_eq!(doc.attribute(b, "id"), Some("dup"));
        assert_eq!(doc.element_by_id("dup"), Some(b));
        assert_eq!(doc.element_by_id("other"), Some(a));

        doc.set_attribute(b, "id", "gone").unwrap();
        assert_eq!(doc.element_by_id("dup"), None);
    }

    #[test]
    fn shared_id_follows_document_order() {
        let mut doc = MemoryDocument::new();
        let root = doc.create_element();
        let late = doc.create_element();
        let early = doc.create_element();
        doc.set_attribute(late, "id", "dup").unwrap();
        doc.set_attribute(early, "id", "dup").unwrap();

        doc.append_child(root, early).unwrap();
        doc.append_child(root, late).unwrap();
        assert_eq!(doc.element_by_id("dup"), Some(early));

        let nested = doc.create_element();
        doc.set_attribute(nested, "id", "dup").unwrap();
        doc.append_child(early, nested).unwrap();
        assert_eq!(doc.element_by_id("dup"), Some(early));
    }

    #[test]
    fn changing_id_reindexes() {
        let mut doc = MemoryDocument::new();
        let a = doc.create_element();
        doc.set_attribute(a, "id", "old").unwrap();
        doc.set_attribute(a, "id", "new").unwrap();

        assert_eq!(doc.element_by_id("old"), None);
        assert_eq!(doc.element_by_id("new"), Some(a));
        assert_eq!(doc.attribute(a, "id"), Some("new"));
    }

    #[test]
    fn closest_includes_self() {
        let (mut doc, nodes) = chain(3);
        let marker = RoleMarker::new("role", "nav");
        doc.set_attribute(nodes[0], "role", "nav").unwrap();
        doc.set_attribute(nodes[2], "role", "nav").unwrap();

        assert_eq!(doc.closest(nodes[2], &marker), Some(nodes[2]));
        assert_eq!(doc.closest(nodes[1], &marker), Some(nodes[0]));
    }

    #[test]
    fn fixture_preserves_child_order() {
        let doc = MemoryDocument::from_json(
            r#"{ "children": [
                { "attributes": { "id": "first" } },
                { "attributes": { "id": "second" } }
            ] }"#,
        )
        .unwrap();

        let root = doc.root().unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.first_child(root), doc.element_by_id("first"));
        assert_eq!(doc.children(root).len(), 2);
        assert_eq!(doc.parent(doc.element_by_id("second").unwrap()), Some(root));
    }

    #[test]
    fn invalid_fixture_is_an_error() {
        let result = MemoryDocument::from_json("{ \"children\": 3 }");
        assert!(matches!(result, Err(TreeError::Fixture(_))));
    }
}
