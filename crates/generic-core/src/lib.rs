//! Generic Components Core
//!
//! Plays the part of the browser for the widgets: upgrades `generic-tabs`
//! elements found in the document, turns mutation records into component
//! reactions and routes clicks and key presses to the right instance.

mod config;
mod error;
mod host;

pub use config::Config;
pub use error::CoreError;
pub use host::Host;

// Re-export the widget and document types hosts work with
pub use generic_dom::{Document, DomError, ElementId, ElementSnapshot, KeyboardEvent, Mutation};
pub use generic_tabs::{
    keymap, Intent, IndexPolicy, KeyMap, SelectedChanged, SelectedListener, TabSelector,
    TabsError,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
///
/// `RUST_LOG` wins over the configured filter when set.
pub fn init_logging(config: &Config) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    // A subscriber may already be installed (tests, embedding apps)
    if let Err(err) = fmt().with_env_filter(filter).with_target(true).try_init() {
        tracing::debug!(error = %err, "Logging already initialized");
    }
}
