//! A waitlist signup service: validates an email from a landing-page form and stores it.

pub mod app;
pub mod client;
pub mod config;
pub mod email;
mod error;
pub mod signup;
pub mod store;
pub mod templ_manager;
pub mod web;

// re-export
pub use app::{serve, App, AppState};
pub use error::{Error, Result};

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Compact, human readable logs. Used by debug builds and tests.
/// Respects `RUST_LOG`, defaults to `debug`.
pub fn init_dbg_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .without_time()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_env_filter(filter)
        .compact()
        .init();
}

/// JSON lines for release builds.
/// Respects `RUST_LOG`, defaults to `info`.
pub fn init_production_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_env_filter(filter)
        .init();
}
