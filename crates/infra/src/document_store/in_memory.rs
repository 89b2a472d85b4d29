use std::sync::RwLock;

use serde_json::{Map, Value};

use shopfront_core::RecordId;

use super::r#trait::{DocumentStore, Record, StoreError};

/// In-memory document store.
///
/// Used directly in tests and as the working copy behind [`super::JsonFileStore`].
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    db: RwLock<Map<String, Value>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a parsed database document.
    pub fn from_document(document: Value) -> Result<Self, StoreError> {
        match document {
            Value::Object(db) => Ok(Self { db: RwLock::new(db) }),
            _ => Err(StoreError::InvalidRoot),
        }
    }

    /// A copy of the whole database document.
    pub fn snapshot(&self) -> Result<Value, StoreError> {
        let db = self.db.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Value::Object(db.clone()))
    }

    /// Consume the store, returning the whole database document.
    pub fn into_document(self) -> Result<Value, StoreError> {
        self.db
            .into_inner()
            .map(Value::Object)
            .map_err(|_| StoreError::Poisoned)
    }

    /// Swap in a whole database document.
    pub fn reset(&self, document: Value) -> Result<(), StoreError> {
        let Value::Object(next) = document else {
            return Err(StoreError::InvalidRoot);
        };
        *self.db.write().map_err(|_| StoreError::Poisoned)? = next;
        Ok(())
    }

    fn read_collection<R>(
        &self,
        resource: &str,
        f: impl FnOnce(&[Value]) -> R,
    ) -> Result<R, StoreError> {
        let db = self.db.read().map_err(|_| StoreError::Poisoned)?;
        match db.get(resource) {
            None => Ok(f(&[])),
            Some(Value::Array(records)) => Ok(f(records)),
            Some(_) => Err(StoreError::NotACollection(resource.to_string())),
        }
    }

    fn write_collection<R>(
        &self,
        resource: &str,
        f: impl FnOnce(&mut Vec<Value>) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut db = self.db.write().map_err(|_| StoreError::Poisoned)?;
        let entry = db
            .entry(resource.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(records) => f(records),
            _ => Err(StoreError::NotACollection(resource.to_string())),
        }
    }
}

fn as_record(value: &Value) -> Option<&Record> {
    value.as_object()
}

fn position(records: &[Value], id: &RecordId) -> Option<usize> {
    records
        .iter()
        .position(|r| r.get("id").is_some_and(|v| id.matches(v)))
}

/// Keep the stored id, whatever the incoming body says.
fn with_id(mut record: Record, id: Option<&Value>) -> Record {
    if let Some(id) = id {
        record.insert("id".to_string(), id.clone());
    }
    record
}

impl DocumentStore for InMemoryDocumentStore {
    fn list(&self, resource: &str) -> Result<Vec<Record>, StoreError> {
        self.read_collection(resource, |records| {
            records.iter().filter_map(as_record).cloned().collect()
        })
    }

    fn get(&self, resource: &str, id: &RecordId) -> Result<Option<Record>, StoreError> {
        self.read_collection(resource, |records| {
            position(records, id)
                .and_then(|i| records.get(i))
                .and_then(as_record)
                .cloned()
        })
    }

    fn insert(&self, resource: &str, mut record: Record) -> Result<Record, StoreError> {
        self.write_collection(resource, |records| {
            match record.get("id").cloned() {
                Some(id) if !id.is_null() => {
                    let key = RecordId::new(match &id {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                    if position(records, &key).is_some() {
                        return Err(StoreError::DuplicateId {
                            resource: resource.to_string(),
                            id: key.to_string(),
                        });
                    }
                }
                _ => {
                    let next = RecordId::next_numeric(records.iter().filter_map(|r| r.get("id")));
                    record.insert("id".to_string(), Value::from(next));
                }
            }
            records.push(Value::Object(record.clone()));
            Ok(record)
        })
    }

    fn replace(
        &self,
        resource: &str,
        id: &RecordId,
        record: Record,
    ) -> Result<Option<Record>, StoreError> {
        self.write_collection(resource, |records| {
            let Some(slot) = position(records, id).and_then(|i| records.get_mut(i)) else {
                return Ok(None);
            };
            let updated = with_id(record, slot.get("id"));
            *slot = Value::Object(updated.clone());
            Ok(Some(updated))
        })
    }

    fn merge(
        &self,
        resource: &str,
        id: &RecordId,
        fields: Record,
    ) -> Result<Option<Record>, StoreError> {
        self.write_collection(resource, |records| {
            let Some(Value::Object(existing)) = position(records, id).and_then(|i| records.get_mut(i))
            else {
                return Ok(None);
            };
            let stored_id = existing.get("id").cloned();
            existing.extend(fields);
            let updated = with_id(std::mem::take(existing), stored_id.as_ref());
            *existing = updated.clone();
            Ok(Some(updated))
        })
    }

    fn remove(&self, resource: &str, id: &RecordId) -> Result<Option<Record>, StoreError> {
        self.write_collection(resource, |records| {
            Ok(position(records, id)
                .map(|i| records.remove(i))
                .and_then(|v| match v {
                    Value::Object(r) => Some(r),
                    _ => None,
                }))
        })
    }
}
