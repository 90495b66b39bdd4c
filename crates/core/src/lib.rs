//! `fruitsupply-core`: shared building blocks for the fruit supply service.
//!
//! Pure types only: identifiers, the domain error model and the `Document`
//! trait that ties a record type to its store collection.

pub mod document;
pub mod error;
pub mod id;

pub use document::Document;
pub use error::DomainError;
pub use id::{DocumentId, TaskId};
