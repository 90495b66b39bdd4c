use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

use fruitsupply_core::{DocumentId, DomainError};

/// Top-level body of a document (without `_id`).
pub type JsonMap = serde_json::Map<String, JsonValue>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error taxonomy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The filter matched zero documents.
    #[error("{0} not found")]
    NotFound(String),

    /// The supplied id string is not a store identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A uniqueness or schema constraint rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A record could not be encoded to / decoded from a document.
    #[error("document encoding failed: {0}")]
    Serialization(String),

    /// The backend (connection, driver) failed.
    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn duplicate(collection: &str, field: &str, value: &JsonValue) -> Self {
        Self::Constraint(format!(
            "duplicate key: {collection}.{field} = {value} already exists"
        ))
    }
}

impl From<DomainError> for StoreError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::InvalidId(msg) => StoreError::InvalidId(msg),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Serialization(value.to_string())
    }
}

/// Which document(s) an operation targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Match on the store-generated `_id`.
    Id(DocumentId),
    /// Match a top-level field by JSON equality.
    Eq { field: String, value: JsonValue },
}

impl Filter {
    pub fn by_id(id: DocumentId) -> Self {
        Filter::Id(id)
    }

    pub fn eq(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether a document with the given id and body satisfies this filter.
    pub fn matches(&self, id: &DocumentId, body: &JsonMap) -> bool {
        match self {
            Filter::Id(wanted) => wanted == id,
            Filter::Eq { field, value } => body.get(field) == Some(value),
        }
    }
}

/// A document as stored: its id plus the body.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub id: DocumentId,
    pub body: JsonMap,
}

/// Store client.
///
/// Operations that take a filter act on the first matching document in id
/// (insertion) order and report how many documents they touched (0 or 1).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Register a uniqueness constraint on a top-level field. Idempotent.
    async fn ensure_unique(&self, collection: &str, field: &str) -> StoreResult<()>;

    /// Insert a new document and return its generated id.
    async fn insert_one(&self, collection: &str, body: JsonMap) -> StoreResult<DocumentId>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<RawDocument>>;

    /// Overwrite the given top-level fields, leaving the rest of the body as is.
    async fn set_fields(&self, collection: &str, filter: &Filter, fields: JsonMap) -> StoreResult<u64>;

    /// Replace the whole body, keeping the id.
    async fn replace_one(&self, collection: &str, filter: &Filter, body: JsonMap) -> StoreResult<u64>;

    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn eq_filter_uses_json_equality() {
        let id = DocumentId::new();
        let mut body = JsonMap::new();
        body.insert("name".into(), json!("Apple"));
        body.insert("price".into(), json!(120.0));

        assert!(Filter::eq("name", "Apple").matches(&id, &body));
        assert!(!Filter::eq("name", "apple").matches(&id, &body));
        assert!(!Filter::eq("region", "Kashmir").matches(&id, &body));
        assert!(Filter::by_id(id).matches(&id, &body));
        assert!(!Filter::by_id(DocumentId::new()).matches(&id, &body));
    }

    #[test]
    fn duplicate_error_mentions_the_constraint() {
        let err = StoreError::duplicate("fruits", "name", &json!("Apple"));
        let msg = err.to_string();
        assert!(msg.contains("constraint violation"));
        assert!(msg.contains("duplicate key"));
        assert!(msg.contains("fruits.name"));
    }

    #[test]
    fn malformed_id_maps_to_invalid_id() {
        let err: StoreError = "xyz".parse::<DocumentId>().unwrap_err().into();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }
}
