//! Tag commands and where they are dispatched.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use serde_json::{Value, json};

/// Characters `encodeURIComponent` leaves alone, besides alphanumerics.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a URI component.
pub(crate) fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// Cross-domain linker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Linker {
    /// Domains sharing the measurement.
    pub domains: Vec<String>,
}

/// Parameters of the `config` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigParams {
    /// Whether `config` sends its own page view. Trackers send them explicitly.
    pub send_page_view: bool,
    /// Transport used for hits.
    pub transport_type: String,
    /// Cross-domain linking.
    pub linker: Linker,
    /// Cookie attributes.
    pub cookie_flags: String,
}

/// Parameters of a `page_view` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    /// Screen name.
    pub page_title: String,
    /// Origin of the hosting page.
    pub page_location: String,
    /// `/` followed by the encoded screen name.
    pub page_path: String,
    /// Measurement id receiving the event.
    pub send_to: String,
}

impl PageView {
    /// Builds the page view for `screen`.
    #[must_use]
    pub fn new(screen: &str, origin: &str, tracking_id: &str) -> Self {
        Self {
            page_title: screen.to_string(),
            page_location: origin.to_string(),
            page_path: format!("/{}", encode_component(screen)),
            send_to: tracking_id.to_string(),
        }
    }
}

/// One call into the tag API.
#[derive(Debug, Clone, PartialEq)]
pub enum TagCommand {
    /// Marks the tag library as initialized.
    Js {
        /// Initialization time.
        timestamp: DateTime<Utc>,
    },
    /// Configures a measurement id.
    Config {
        /// Measurement id.
        tracking_id: String,
        /// Configuration parameters.
        params: ConfigParams,
    },
    /// Sends an event.
    Event {
        /// Event name.
        name: String,
        /// Page view parameters.
        params: PageView,
    },
}

impl TagCommand {
    /// Returns the command name: `js`, `config` or `event`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Js { .. } => "js",
            Self::Config { .. } => "config",
            Self::Event { .. } => "event",
        }
    }

    /// Renders the command as the argument array of a tag call.
    #[must_use]
    pub fn arguments(&self) -> Value {
        match self {
            Self::Js { timestamp } => json!([self.kind(), timestamp.to_rfc3339()]),
            Self::Config {
                tracking_id,
                params,
            } => json!([self.kind(), tracking_id, params]),
            Self::Event { name, params } => json!([self.kind(), name, params]),
        }
    }
}

/// Receives tag commands. Implemented by the host's dispatch layer.
pub trait TagSink: Send + Sync {
    /// Queues a command.
    fn push(&self, command: TagCommand);
}

/// In-memory command queue.
///
/// # Example
///
/// ```
/// use beacon_tracker::{DataLayer, PageView, TagCommand, TagSink};
///
/// let layer = DataLayer::new();
/// layer.push(TagCommand::Event {
///     name: "page_view".to_string(),
///     params: PageView::new("Home", "https://site.example", "G-1"),
/// });
///
/// assert_eq!(layer.to_json()[0][2]["page_path"], "/Home");
/// ```
#[derive(Debug, Default)]
pub struct DataLayer {
    commands: Mutex<Vec<TagCommand>>,
}

impl DataLayer {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every queued command.
    #[must_use]
    pub fn commands(&self) -> Vec<TagCommand> {
        self.commands.lock().clone()
    }

    /// Returns the number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.lock().len()
    }

    /// Returns `true` if nothing was queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.lock().is_empty()
    }

    /// Returns the names of queued events, in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.commands
            .lock()
            .iter()
            .filter_map(|command| match command {
                TagCommand::Event { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Renders the queue as an array of argument arrays.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.commands
                .lock()
                .iter()
                .map(TagCommand::arguments)
                .collect(),
        )
    }
}

impl TagSink for DataLayer {
    fn push(&self, command: TagCommand) {
        tracing::trace!(kind = command.kind(), "tag command queued");
        self.commands.lock().push(command);
    }
}
