//! Generic Components Document Model
//!
//! The host environment widgets run against: an element tree with
//! attributes, text and focus. Every write leaves a mutation record behind
//! so a dispatcher can run component reactions after the fact.

mod document;
mod error;
mod event;
mod markup;

pub use document::{Document, ElementId, ElementSnapshot, Mutation};
pub use error::DomError;
pub use event::KeyboardEvent;

pub type Result<T> = std::result::Result<T, DomError>;
