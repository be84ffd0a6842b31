//! Example site navigation tracked with Beacon.
//!
//! A [`DemoSite`] is a list of named screens, each carrying one tracker
//! widget. A [`Session`] walks through the screens the way a preview does:
//! the current screen is always the navigation container's first child,
//! previously visited screens stay mounted behind it, and only the current
//! screen is in the navigation target.
//!
//! ```text
//! NavigationContainer
//! ├── Pricing            <- current screen
//! │   └── #ga-pricing
//! └── Home               <- still mounted
//!     └── #ga-home
//! ```
//!
//! All trackers share one load cache, so the tag script is attached once.

use beacon_loader::{ManualEnvironment, ResourceLoadCache};
use beacon_screen::{ElementFixture, MemoryDocument, ScreenMarkers};
use beacon_tracker::{DataLayer, RenderTarget, Tracker, TrackerBuilder, TrackerConfig};
use std::sync::Arc;

/// Errors driving a [`Session`].
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// Navigation to a screen index the site does not have.
    #[error("no screen at index {0}")]
    UnknownScreen(usize),
}

/// How the simulated host answers the script load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// The script loads.
    #[default]
    Load,
    /// The script is blocked.
    Fail,
}

/// Named screens served from one origin.
#[derive(Debug, Clone)]
pub struct DemoSite {
    origin: String,
    screens: Vec<String>,
    markers: ScreenMarkers,
}

impl DemoSite {
    /// Creates a site with the given screens.
    #[must_use]
    pub fn new(origin: impl Into<String>, screens: Vec<String>) -> Self {
        Self {
            origin: origin.into(),
            screens,
            markers: ScreenMarkers::default(),
        }
    }

    /// Returns the screen names.
    #[must_use]
    pub fn screens(&self) -> &[String] {
        &self.screens
    }

    /// Returns the tracker anchor id for a screen.
    #[must_use]
    pub fn anchor_id(screen: &str) -> String {
        format!("ga-{}", screen.to_lowercase().replace(' ', "-"))
    }

    /// Builds the document with `current` on top of the already visited
    /// screens in `history`, most recent first.
    #[must_use]
    pub fn document(&self, current: usize, history: &[usize]) -> MemoryDocument {
        let mut nav = ElementFixture::default();
        nav.attributes.insert(
            self.markers.navigation.attribute.clone(),
            self.markers.navigation.value.clone(),
        );

        let stack = core::iter::once(current)
            .chain(history.iter().copied().filter(|index| *index != current));
        for index in stack {
            if let Some(name) = self.screens.get(index) {
                nav.children.push(self.screen_fixture(name));
            }
        }
        MemoryDocument::from_fixture(&nav)
    }

    fn screen_fixture(&self, name: &str) -> ElementFixture {
        let mut anchor = ElementFixture::default();
        anchor
            .attributes
            .insert("id".to_string(), Self::anchor_id(name));

        let mut screen = ElementFixture::default();
        screen
            .attributes
            .insert(self.markers.name_attribute.clone(), name.to_string());
        screen.children.push(anchor);
        screen
    }
}

/// A preview session walking through a [`DemoSite`].
#[derive(Debug)]
pub struct Session {
    site: DemoSite,
    config: TrackerConfig,
    render_target: RenderTarget,
    outcome: ScriptOutcome,
    cache: ResourceLoadCache,
    env: Arc<ManualEnvironment>,
    layer: Arc<DataLayer>,
    history: Vec<usize>,
    trackers: Vec<(usize, Tracker<ManualEnvironment>)>,
}

impl Session {
    /// Starts a session with nothing visited yet.
    #[must_use]
    pub fn new(
        site: DemoSite,
        config: TrackerConfig,
        render_target: RenderTarget,
        outcome: ScriptOutcome,
    ) -> Self {
        Self {
            site,
            config,
            render_target,
            outcome,
            cache: ResourceLoadCache::new(),
            env: Arc::new(ManualEnvironment::new()),
            layer: Arc::new(DataLayer::new()),
            history: Vec::new(),
            trackers: Vec::new(),
        }
    }

    /// Navigates to the screen at `index`.
    ///
    /// A first visit mounts the screen's tracker; a revisit brings its
    /// existing tracker back into the navigation target.
    pub async fn navigate(&mut self, index: usize) -> Result<(), DemoError> {
        let name = self
            .site
            .screens()
            .get(index)
            .cloned()
            .ok_or(DemoError::UnknownScreen(index))?;
        tracing::info!(screen = %name, "navigating");

        for (_, tracker) in &mut self.trackers {
            tracker.set_in_target(false);
        }

        let doc = self.site.document(index, &self.history);
        self.history.retain(|visited| *visited != index);
        self.history.insert(0, index);

        if let Some((_, tracker)) = self.trackers.iter_mut().find(|(i, _)| *i == index) {
            tracker.set_in_target(true);
            return Ok(());
        }

        let mut tracker = TrackerBuilder::new(self.config.clone(), DemoSite::anchor_id(&name))
            .render_target(self.render_target)
            .origin(self.site.origin.clone())
            .mount(
                self.cache.clone(),
                self.env.clone(),
                self.layer.clone(),
                &doc,
            );

        if let Some(key) = tracker.script_key()
            && self.env.pending_count() > 0
        {
            match self.outcome {
                ScriptOutcome::Load => self.env.succeed(key),
                ScriptOutcome::Fail => self.env.fail(key, "blocked by the host"),
            };
        }
        let state = tracker.settled().await;
        tracing::debug!(screen = %name, ?state, view = ?tracker.view(), "tracker settled");

        self.trackers.push((index, tracker));
        Ok(())
    }

    /// Returns the commands pushed so far.
    #[must_use]
    pub fn data_layer(&self) -> &DataLayer {
        &self.layer
    }

    /// Returns the mounted trackers in mount order.
    pub fn trackers(&self) -> impl Iterator<Item = &Tracker<ManualEnvironment>> {
        self.trackers.iter().map(|(_, tracker)| tracker)
    }

    /// Returns how often the script was attached.
    #[must_use]
    pub fn script_attachments(&self) -> usize {
        self.config
            .script_key()
            .map_or(0, |key| self.env.attach_count(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_screen::resolve_screen_name;

    fn site() -> DemoSite {
        DemoSite::new(
            "https://demo.example",
            vec!["Home".to_string(), "Pricing".to_string(), "About Us".to_string()],
        )
    }

    #[test]
    fn current_screen_is_first_child() {
        let site = site();
        let doc = site.document(1, &[0]);
        let markers = ScreenMarkers::default();

        assert_eq!(
            resolve_screen_name(&doc, "ga-pricing", &markers).as_deref(),
            Some("Pricing")
        );
        assert_eq!(
            resolve_screen_name(&doc, "ga-home", &markers).as_deref(),
            Some("Pricing")
        );
    }

    #[test]
    fn anchor_ids_are_slugs() {
        assert_eq!(DemoSite::anchor_id("About Us"), "ga-about-us");
    }

    #[tokio::test]
    async fn session_tracks_each_visit() {
        let mut session = Session::new(
            site(),
            TrackerConfig::with_tracking_id("G-DEMO"),
            RenderTarget::Preview,
            ScriptOutcome::Load,
        );

        session.navigate(0).await.unwrap();
        session.navigate(1).await.unwrap();
        session.navigate(0).await.unwrap();

        let layer = session.data_layer();
        assert_eq!(layer.event_names().len(), 3);
        assert_eq!(session.script_attachments(), 1);
        assert_eq!(session.trackers().filter(|t| t.is_configured()).count(), 1);
        assert!(matches!(
            session.navigate(9).await,
            Err(DemoError::UnknownScreen(9))
        ));
    }

    #[tokio::test]
    async fn blocked_script_tracks_nothing() {
        let mut session = Session::new(
            site(),
            TrackerConfig::with_tracking_id("G-DEMO"),
            RenderTarget::Preview,
            ScriptOutcome::Fail,
        );

        session.navigate(0).await.unwrap();

        assert!(session.data_layer().is_empty());
        assert!(
            session
                .trackers()
                .all(|t| t.view() == beacon_tracker::TrackerView::LoadError)
        );
    }
}
