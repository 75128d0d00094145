//! Document error types

use thiserror::Error;

use crate::document::ElementId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Element not found: {0}")]
    NotFound(ElementId),

    #[error("Not an element: {0}")]
    NotAnElement(ElementId),

    #[error("Cannot insert {child} into {parent}: would create a cycle")]
    HierarchyRequest { parent: ElementId, child: ElementId },

    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: ElementId, child: ElementId },
}
