use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use shopfront_core::RecordId;

use super::in_memory::InMemoryDocumentStore;
use super::r#trait::{DocumentStore, Record, StoreError};

/// Document store persisted to a single JSON file.
///
/// Reads are served from memory. A mutation is applied to a staged copy of
/// the document, written to disk (sibling temp file, then rename), and only
/// then swapped into memory, so a failed write leaves the store unchanged.
/// Mutations are serialised by `write_gate` and do blocking file IO; async
/// callers run them on the blocking pool.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    memory: InMemoryDocumentStore,
    write_gate: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store, creating an empty `{}` document if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let memory = if path.exists() {
            let raw = fs::read(&path).map_err(|e| io_error(&path, e))?;
            InMemoryDocumentStore::from_document(serde_json::from_slice(&raw)?)?
        } else {
            tracing::info!(path = %path.display(), "creating empty document store");
            InMemoryDocumentStore::new()
        };

        write_document(&path, &memory.snapshot()?)?;
        Ok(Self {
            path,
            memory,
            write_gate: Mutex::new(()),
        })
    }

    /// Apply a mutation to a staged copy; commit it if it changed anything.
    fn mutate<R>(
        &self,
        changed: impl Fn(&R) -> bool,
        f: impl FnOnce(&InMemoryDocumentStore) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let _gate = self.write_gate.lock().map_err(|_| StoreError::Poisoned)?;

        let staged = InMemoryDocumentStore::from_document(self.memory.snapshot()?)?;
        let result = f(&staged)?;
        if changed(&result) {
            let document = staged.into_document()?;
            write_document(&self.path, &document).inspect_err(|e| {
                tracing::error!(path = %self.path.display(), error = %e, "failed to persist document store");
            })?;
            self.memory.reset(document)?;
        }
        Ok(result)
    }
}

fn write_document(path: &Path, document: &Value) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(document)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(|e| io_error(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| io_error(path, e))?;

    tracing::debug!(path = %path.display(), "document store persisted");
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl DocumentStore for JsonFileStore {
    fn list(&self, resource: &str) -> Result<Vec<Record>, StoreError> {
        self.memory.list(resource)
    }

    fn get(&self, resource: &str, id: &RecordId) -> Result<Option<Record>, StoreError> {
        self.memory.get(resource, id)
    }

    fn insert(&self, resource: &str, record: Record) -> Result<Record, StoreError> {
        self.mutate(|_| true, |m| m.insert(resource, record))
    }

    fn replace(
        &self,
        resource: &str,
        id: &RecordId,
        record: Record,
    ) -> Result<Option<Record>, StoreError> {
        self.mutate(Option::is_some, |m| m.replace(resource, id, record))
    }

    fn merge(
        &self,
        resource: &str,
        id: &RecordId,
        fields: Record,
    ) -> Result<Option<Record>, StoreError> {
        self.mutate(Option::is_some, |m| m.merge(resource, id, fields))
    }

    fn remove(&self, resource: &str, id: &RecordId) -> Result<Option<Record>, StoreError> {
        self.mutate(Option::is_some, |m| m.remove(resource, id))
    }
}
