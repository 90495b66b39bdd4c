//! Binding between a record type and its document-store collection.

use serde::{Serialize, de::DeserializeOwned};

/// A record persisted as one JSON document in a named collection.
///
/// The store owns the `_id` field; implementors must not declare it. Reads
/// return the record next to its id (see `Stored` in the infra crate).
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, e.g. `"fruits"`.
    const COLLECTION: &'static str;

    /// Fields that must be unique across the collection.
    const UNIQUE_FIELDS: &'static [&'static str] = &[];
}
