//! Screen-context resolution for Beacon.
//!
//! Given the id of an anchor element, [`ScreenContextResolver`] walks up to
//! the nearest navigation container and derives the name of the screen it
//! currently shows. The lookup runs once; later changes to the tree are not
//! observed.
//!
//! The resolver only needs the query primitives of [`DocumentTree`].
//! [`MemoryDocument`] implements them over an in-memory arena, which is also
//! how tests describe documents.
//!
//! # Example
//!
//! ```
//! use beacon_screen::{MemoryDocument, ScreenContextResolver};
//!
//! let doc = MemoryDocument::from_json(r#"{
//!     "attributes": { "data-framer-component-type": "NavigationContainer" },
//!     "children": [{
//!         "attributes": { "data-framer-name": "Dashboard" },
//!         "children": [{ "attributes": { "id": "tracker" } }]
//!     }]
//! }"#).unwrap();
//!
//! let resolver = ScreenContextResolver::new("tracker");
//! assert_eq!(resolver.resolve(&doc), Some("Dashboard"));
//! ```

mod document;
mod markers;
mod resolver;

pub use document::{DocumentTree, ElementFixture, MemoryDocument, NodeId, TreeError};
pub use markers::{RoleMarker, ScreenMarkers};
pub use resolver::{ScreenContextResolver, resolve_screen_name};
