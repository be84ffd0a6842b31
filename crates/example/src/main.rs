//! Example tracking CLI.
//!
//! Walks a preview through a list of screens, then prints every tag command
//! the trackers pushed.
//!
//! # Usage
//!
//! ```bash
//! beacon-demo [screen...]
//! ```
//!
//! # Environment
//!
//! - `BEACON_TRACKING_ID`: measurement id (required for any tracking)
//! - `BEACON_RENDER_TARGET`: `canvas`, `export`, `thumbnail` or `preview` (default)
//! - `BEACON_SCRIPT_OUTCOME`: `load` (default) or `fail`
//! - `BEACON_ORIGIN`: reported page location
//!
//! # Example
//!
//! ```bash
//! BEACON_TRACKING_ID=G-DEMO beacon-demo Home Pricing "About Us" Home
//! ```

use beacon_core::{BuildInfo, TracingFormat, TracingSetup};
use beacon_tracker::{RenderTarget, TrackerConfig};
use example::{DemoSite, ScriptOutcome, Session};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    TracingSetup::new()
        .with_format(TracingFormat::Compact)
        .init();
    let build = BuildInfo::default();
    tracing::info!(version = build.version, debug = build.debug, "beacon demo");

    let config = TrackerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let render_target = match std::env::var("BEACON_RENDER_TARGET") {
        Ok(value) => serde_json::from_value::<RenderTarget>(serde_json::Value::String(value))
            .unwrap_or_else(|e| {
                eprintln!("Error: invalid BEACON_RENDER_TARGET: {e}");
                std::process::exit(1);
            }),
        Err(_) => RenderTarget::Preview,
    };

    let outcome = match std::env::var("BEACON_SCRIPT_OUTCOME").as_deref() {
        Ok("fail") => ScriptOutcome::Fail,
        _ => ScriptOutcome::Load,
    };
    let origin =
        std::env::var("BEACON_ORIGIN").unwrap_or_else(|_| "https://demo.example".to_string());

    // Visit order; repeated names revisit a screen
    let mut visits: Vec<String> = std::env::args().skip(1).collect();
    if visits.is_empty() {
        visits = ["Home", "Pricing", "Home"].map(String::from).to_vec();
    }
    let mut screens: Vec<String> = Vec::new();
    for name in &visits {
        if !screens.contains(name) {
            screens.push(name.clone());
        }
    }

    let site = DemoSite::new(origin, screens.clone());
    let mut session = Session::new(site, config, render_target, outcome);

    for name in &visits {
        let Some(index) = screens.iter().position(|screen| screen == name) else {
            continue;
        };
        if let Err(e) = session.navigate(index).await {
            eprintln!("Error: {e}");
        }
    }

    for tracker in session.trackers() {
        tracing::info!(
            screen = ?tracker.screen_name(),
            view = ?tracker.view(),
            configured = tracker.is_configured(),
            "tracker"
        );
    }

    match serde_json::to_string_pretty(&session.data_layer().to_json()) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}
