//! Core error types

use thiserror::Error;

use generic_dom::ElementId;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Document error: {0}")]
    Dom(#[from] generic_dom::DomError),

    #[error("Tabs error: {0}")]
    Tabs(#[from] generic_tabs::TabsError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No component attached to {0}")]
    UnknownComponent(ElementId),
}

// Implement std::io::Error conversion for config loading
impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}
