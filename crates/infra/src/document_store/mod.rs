//! JSON document storage behind a small CRUD boundary.
//!
//! The whole database is one JSON object whose top-level keys are resource
//! names and whose values are arrays of records:
//!
//! ```json
//! { "products": [ { "id": 1, "name": "Air Zoom" } ], "orders": [] }
//! ```

pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use json_file::JsonFileStore;
pub use r#trait::{DocumentStore, Record, StoreError};
