//! `shopfront-core` — request-body validation building blocks.
//!
//! This crate is **pure**: no HTTP framework, no storage, no clock. Stages
//! receive the current time through [`StageContext`].

pub mod error;
pub mod id;
pub mod pipeline;
pub mod request;
pub mod value;

pub use error::{FieldErrors, Rejection};
pub use id::RecordId;
pub use pipeline::{StageContext, StageOutcome, ValidationPipeline, ValidationStage};
pub use request::{RequestTarget, Verb};
pub use value::{Numeric, is_truthy};

/// A parsed JSON request body (always a JSON object).
pub type Body = serde_json::Map<String, serde_json::Value>;
