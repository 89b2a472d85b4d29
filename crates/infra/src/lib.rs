//! Infrastructure layer: document storage and uploaded files.

pub mod document_store;
pub mod uploads;

pub use document_store::{
    DocumentStore, InMemoryDocumentStore, JsonFileStore, Record, StoreError,
};
pub use uploads::{ImageStore, UploadError};
