//! Tab selector error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TabsError {
    #[error("Invalid selected value: {0:?}")]
    InvalidSelected(String),

    #[error("Selected index {index} out of range for {len} tabs")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Document error: {0}")]
    Dom(#[from] generic_dom::DomError),
}
