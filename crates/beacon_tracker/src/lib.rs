//! Page-view tracking for embedded analytics widgets.
//!
//! A [`Tracker`] is what a widget instance mounts. It combines the two
//! independent pieces of Beacon:
//!
//! - a [`ResourceLoader`](beacon_loader::ResourceLoader) for the tag script,
//!   active only when the widget renders in [`RenderTarget::Preview`]
//! - a [`ScreenContextResolver`](beacon_screen::ScreenContextResolver) naming
//!   the screen the widget sits on
//!
//! Once the script is ready it pushes [`TagCommand`]s into a [`TagSink`]:
//! a one-time configuration by whichever tracker loaded the script, and a
//! `page_view` event every time its screen becomes the navigation target.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use beacon_loader::{ManualEnvironment, ResourceLoadCache};
//! use beacon_screen::MemoryDocument;
//! use beacon_tracker::{DataLayer, RenderTarget, TrackerBuilder, TrackerConfig};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let doc = MemoryDocument::from_json(r#"{
//!     "attributes": { "data-framer-component-type": "NavigationContainer" },
//!     "children": [{
//!         "attributes": { "data-framer-name": "Pricing" },
//!         "children": [{ "attributes": { "id": "ga" } }]
//!     }]
//! }"#).unwrap();
//!
//! let env = Arc::new(ManualEnvironment::new());
//! let layer = Arc::new(DataLayer::new());
//! let config = TrackerConfig::with_tracking_id("G-TEST");
//!
//! let mut tracker = TrackerBuilder::new(config, "ga")
//!     .render_target(RenderTarget::Preview)
//!     .origin("https://site.example")
//!     .mount(ResourceLoadCache::new(), env.clone(), layer.clone(), &doc);
//!
//! env.succeed(tracker.script_key().unwrap());
//! tracker.settled().await;
//!
//! assert_eq!(layer.event_names(), vec!["page_view"]);
//! # });
//! ```

mod config;
mod render_target;
mod tag;
mod tracker;

pub use config::{ConfigError, TrackerConfig};
pub use render_target::RenderTarget;
pub use tag::{ConfigParams, DataLayer, Linker, PageView, TagCommand, TagSink};
pub use tracker::{Tracker, TrackerBuilder, TrackerView};
