//! Tracker configuration.

use crate::tag::{ConfigParams, Linker, encode_component};
use serde::{Deserialize, Serialize};

/// Environment variable holding the measurement id.
const TRACKING_ID_VAR: &str = "BEACON_TRACKING_ID";
/// Environment variable toggling canvas instructions.
const SHOW_INSTRUCTIONS_VAR: &str = "BEACON_SHOW_INSTRUCTIONS";
/// Environment variable overriding the script base URL.
const SCRIPT_BASE_URL_VAR: &str = "BEACON_SCRIPT_BASE_URL";

/// Errors loading a [`TrackerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid tracker config: {0}")]
    Parse(#[from] serde_json::Error),

    /// An environment variable held a value that could not be interpreted.
    #[error("invalid value for {name}: {value:?}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Settings a host passes to every tracker instance.
///
/// Missing fields take their defaults, so `{}` is a valid configuration
/// (one without a measurement id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Measurement id, for example `G-XXXXXXX`. Empty counts as missing.
    pub tracking_id: Option<String>,
    /// Whether the canvas shows setup instructions rather than the icon.
    pub show_instructions: bool,
    /// URL the tag script is served from, without query.
    pub script_base_url: String,
    /// Domains linked for cross-domain measurement.
    pub linker_domains: Vec<String>,
    /// Cookie attributes passed to `config`.
    pub cookie_flags: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tracking_id: None,
            show_instructions: true,
            script_base_url: "https://www.googletagmanager.com/gtag/js".to_string(),
            linker_domains: vec!["framercanvas.com".to_string(), "framer.com".to_string()],
            cookie_flags: "max-age:7200;secure;samesite=none".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Default configuration with the given measurement id.
    #[must_use]
    pub fn with_tracking_id(tracking_id: impl Into<String>) -> Self {
        Self {
            tracking_id: Some(tracking_id.into()),
            ..Self::default()
        }
    }

    /// Parses a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads the configuration from `BEACON_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(id) = std::env::var(TRACKING_ID_VAR) {
            config.tracking_id = Some(id);
        }
        if let Ok(url) = std::env::var(SCRIPT_BASE_URL_VAR) {
            config.script_base_url = url;
        }
        if let Ok(value) = std::env::var(SHOW_INSTRUCTIONS_VAR) {
            config.show_instructions = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        name: SHOW_INSTRUCTIONS_VAR,
                        value,
                    });
                }
            };
        }
        Ok(config)
    }

    /// Returns the measurement id, treating an empty one as missing.
    #[must_use]
    pub fn tracking_id(&self) -> Option<&str> {
        self.tracking_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Returns the script URL for the measurement id, which doubles as the
    /// shared load key. `None` without a measurement id.
    #[must_use]
    pub fn script_key(&self) -> Option<String> {
        self.tracking_id()
            .map(|id| format!("{}?id={}", self.script_base_url, encode_component(id)))
    }

    /// Parameters of the one-time `config` command.
    #[must_use]
    pub fn config_params(&self) -> ConfigParams {
        ConfigParams {
            send_page_view: false,
            transport_type: "xhr".to_string(),
            linker: Linker {
                domains: self.linker_domains.clone(),
            },
            cookie_flags: self.cookie_flags.clone(),
        }
    }
}
