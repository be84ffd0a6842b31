//! The tracker a widget instance mounts.

use crate::config::TrackerConfig;
use crate::render_target::RenderTarget;
use crate::tag::{PageView, TagCommand, TagSink};
use beacon_loader::{
    LoadState, ResourceEnvironment, ResourceKey, ResourceLoadCache, ResourceLoader,
};
use beacon_screen::{DocumentTree, ScreenContextResolver, ScreenMarkers};
use std::sync::Arc;
use tracing::{debug, info};

/// What a tracker shows in its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerView {
    /// The tag script failed to load.
    LoadError,
    /// No measurement id is configured.
    MissingTrackingId,
    /// The product icon.
    Icon,
    /// Setup instructions, on the canvas only.
    Instructions,
    /// Nothing; the tracker is invisible in previews and exports.
    Hidden,
}

// ─────────────────────────────────────────────────────────────────────────────
// TrackerBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Collects mount-time settings for a [`Tracker`].
#[derive(Debug, Clone)]
pub struct TrackerBuilder {
    config: TrackerConfig,
    anchor_id: String,
    render_target: RenderTarget,
    origin: String,
    markers: ScreenMarkers,
    in_target: bool,
}

impl TrackerBuilder {
    /// Starts building a tracker anchored at the element with `anchor_id`.
    #[must_use]
    pub fn new(config: TrackerConfig, anchor_id: impl Into<String>) -> Self {
        Self {
            config,
            anchor_id: anchor_id.into(),
            render_target: RenderTarget::Canvas,
            origin: String::new(),
            markers: ScreenMarkers::default(),
            in_target: true,
        }
    }

    /// Sets the render target. Defaults to [`RenderTarget::Canvas`].
    #[must_use]
    pub fn render_target(mut self, render_target: RenderTarget) -> Self {
        self.render_target = render_target;
        self
    }

    /// Sets the origin reported as `page_location`.
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Replaces the markers used for screen resolution.
    #[must_use]
    pub fn markers(mut self, markers: ScreenMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Sets whether the tracker starts inside the current navigation target.
    /// Defaults to `true`.
    #[must_use]
    pub fn in_target(mut self, in_target: bool) -> Self {
        self.in_target = in_target;
        self
    }

    /// Mounts the tracker: starts the script load, resolves the screen name
    /// against `tree` and reacts to whatever state is already known.
    ///
    /// # Panics
    ///
    /// Panics when the render target is [`RenderTarget::Preview`], a tracking
    /// id is set and no Tokio runtime is running, since the load completion
    /// is spawned.
    pub fn mount<E, T>(
        self,
        cache: ResourceLoadCache,
        environment: Arc<E>,
        sink: Arc<dyn TagSink>,
        tree: &T,
    ) -> Tracker<E>
    where
        E: ResourceEnvironment,
        T: DocumentTree + ?Sized,
    {
        let mut loader =
            ResourceLoader::new(cache, environment, self.render_target.activation());
        if let Some(key) = self.config.script_key() {
            loader.load(key);
        }

        let screen = ScreenContextResolver::new(self.anchor_id).with_markers(self.markers);
        screen.resolve(tree);

        info!(
            target_kind = ?self.render_target,
            screen = ?screen.resolved().flatten(),
            has_tracking_id = self.config.tracking_id().is_some(),
            "tracker mounted"
        );

        let mut tracker = Tracker {
            config: self.config,
            render_target: self.render_target,
            origin: self.origin,
            loader,
            screen,
            sink,
            in_target: self.in_target,
            configured: false,
            page_view_sent: false,
        };
        tracker.react();
        tracker
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracker
// ─────────────────────────────────────────────────────────────────────────────

/// One mounted tracker.
///
/// Configures the tag library once, if this tracker is the one that loaded
/// the script, and sends a `page_view` each time its screen becomes the
/// navigation target in a preview.
pub struct Tracker<E: ResourceEnvironment> {
    config: TrackerConfig,
    render_target: RenderTarget,
    origin: String,
    loader: ResourceLoader<E>,
    screen: ScreenContextResolver,
    sink: Arc<dyn TagSink>,
    in_target: bool,
    configured: bool,
    page_view_sent: bool,
}

impl<E: ResourceEnvironment> core::fmt::Debug for Tracker<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracker")
            .field("render_target", &self.render_target)
            .field("loader", &self.loader)
            .field("screen", &self.screen_name())
            .field("in_target", &self.in_target)
            .field("configured", &self.configured)
            .finish_non_exhaustive()
    }
}

impl<E: ResourceEnvironment> Tracker<E> {
    /// Waits for the script load to settle, then sends whatever commands
    /// became due.
    pub async fn settled(&mut self) -> LoadState {
        let state = self.loader.settled().await;
        self.react();
        state
    }

    /// Records whether the tracker's screen is the current navigation target.
    ///
    /// Leaving the target re-arms the page view; entering it sends one if the
    /// script is ready.
    pub fn set_in_target(&mut self, in_target: bool) {
        if self.in_target == in_target {
            return;
        }
        self.in_target = in_target;
        if !in_target {
            self.page_view_sent = false;
        }
        self.react();
    }

    /// Returns the script load state.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.loader.state()
    }

    /// Returns the script key, if a tracking id is configured.
    #[must_use]
    pub fn script_key(&self) -> Option<&str> {
        self.loader.key().map(ResourceKey::as_str)
    }

    /// Returns the screen name resolved at mount.
    #[must_use]
    pub fn screen_name(&self) -> Option<&str> {
        self.screen.resolved().flatten()
    }

    /// Returns the render target.
    #[must_use]
    pub fn render_target(&self) -> RenderTarget {
        self.render_target
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Returns `true` once this tracker pushed the `js`/`config` pair.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Decides what the tracker shows.
    #[must_use]
    pub fn view(&self) -> TrackerView {
        if self.load_state().errored {
            return TrackerView::LoadError;
        }
        if self.config.tracking_id().is_none() {
            return TrackerView::MissingTrackingId;
        }
        match self.render_target {
            RenderTarget::Canvas if self.config.show_instructions => TrackerView::Instructions,
            RenderTarget::Canvas | RenderTarget::Thumbnail => TrackerView::Icon,
            RenderTarget::Export | RenderTarget::Preview => TrackerView::Hidden,
        }
    }

    fn react(&mut self) {
        let state = self.loader.state();
        if !state.is_ready() {
            return;
        }
        let Some(tracking_id) = self.config.tracking_id().map(str::to_owned) else {
            return;
        };

        if !self.configured && !state.was_already_present {
            self.sink.push(TagCommand::Js {
                timestamp: chrono::Utc::now(),
            });
            self.sink.push(TagCommand::Config {
                tracking_id: tracking_id.clone(),
                params: self.config.config_params(),
            });
            self.configured = true;
            info!(tracking_id = %tracking_id, "tag library configured");
        }

        if self.page_view_sent || self.render_target != RenderTarget::Preview || !self.in_target {
            return;
        }
        let Some(screen) = self.screen_name() else {
            debug!("no screen name, skipping page view");
            return;
        };

        let view = PageView::new(screen, &self.origin, &tracking_id);
        debug!(page_path = %view.page_path, "sending page view");
        self.sink.push(TagCommand::Event {
            name: "page_view".to_string(),
            params: view,
        });
        self.page_view_sent = true;
    }
}
