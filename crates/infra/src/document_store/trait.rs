use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use shopfront_core::RecordId;

/// A stored record: one JSON object inside a collection.
pub type Record = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("document is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("document root must be a JSON object")]
    InvalidRoot,

    #[error("'{0}' is not a collection")]
    NotACollection(String),

    #[error("duplicate id {id} in '{resource}'")]
    DuplicateId { resource: String, id: String },

    #[error("store lock poisoned")]
    Poisoned,
}

/// Collections of JSON records keyed by resource name.
///
/// Every record carries an `id`; the store assigns the next numeric id on
/// insert when the record has none.
pub trait DocumentStore: Send + Sync {
    fn list(&self, resource: &str) -> Result<Vec<Record>, StoreError>;

    fn get(&self, resource: &str, id: &RecordId) -> Result<Option<Record>, StoreError>;

    /// Append a record, returning it with its id.
    fn insert(&self, resource: &str, record: Record) -> Result<Record, StoreError>;

    /// Replace a record wholesale, keeping its id. `None` if absent.
    fn replace(
        &self,
        resource: &str,
        id: &RecordId,
        record: Record,
    ) -> Result<Option<Record>, StoreError>;

    /// Overwrite the given top-level fields of a record, keeping its id. `None` if absent.
    fn merge(
        &self,
        resource: &str,
        id: &RecordId,
        fields: Record,
    ) -> Result<Option<Record>, StoreError>;

    /// Delete a record, returning it. `None` if absent.
    fn remove(&self, resource: &str, id: &RecordId) -> Result<Option<Record>, StoreError>;
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn list(&self, resource: &str) -> Result<Vec<Record>, StoreError> {
        (**self).list(resource)
    }

    fn get(&self, resource: &str, id: &RecordId) -> Result<Option<Record>, StoreError> {
        (**self).get(resource, id)
    }

    fn insert(&self, resource: &str, record: Record) -> Result<Record, StoreError> {
        (**self).insert(resource, record)
    }

    fn replace(
        &self,
        resource: &str,
        id: &RecordId,
        record: Record,
    ) -> Result<Option<Record>, StoreError> {
        (**self).replace(resource, id, record)
    }

    fn merge(
        &self,
        resource: &str,
        id: &RecordId,
        fields: Record,
    ) -> Result<Option<Record>, StoreError> {
        (**self).merge(resource, id, fields)
    }

    fn remove(&self, resource: &str, id: &RecordId) -> Result<Option<Record>, StoreError> {
        (**self).remove(resource, id)
    }
}
