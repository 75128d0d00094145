//! Generic Tabs
//!
//! A tab list paired with panels by position. The selector owns one index,
//! mirrors it into the host's `selected` attribute, keeps the ARIA state of
//! every tab and panel in step with it and moves it in response to clicks
//! and arrow/Home/End keys.

mod error;
mod event;
pub mod keymap;
mod policy;
mod selector;

pub use error::TabsError;
pub use event::SelectedChanged;
pub use keymap::{Intent, KeyMap};
pub use policy::IndexPolicy;
pub use selector::{
    SelectedListener, TabSelector, DEFAULT_LABEL, OBSERVED_ATTRIBUTES, PANEL_SLOT,
    SELECTED_ATTRIBUTE, TAB_ID_PREFIX, TAB_SLOT, TAG_NAME,
};

pub type Result<T> = std::result::Result<T, TabsError>;
