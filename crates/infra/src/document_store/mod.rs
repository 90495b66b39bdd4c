//! Document store boundary.
//!
//! Named collections of schema-flexible JSON documents, addressed by filter.
//! Every single-document write is atomic; there are no multi-document
//! transactions.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use r#trait::{DocumentStore, Filter, JsonMap, RawDocument, StoreError, StoreResult};
