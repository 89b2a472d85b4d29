//! Ordered validation pipeline.
//!
//! A pipeline is a list of [`ValidationStage`]s. For a given request target,
//! every stage that applies runs in registration order against the body; the
//! first rejection short-circuits the rest.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Body, Rejection, RequestTarget};

/// Inputs a stage may depend on besides the body itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StageContext {
    pub now: DateTime<Utc>,
}

impl StageContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// `now` as an ISO-8601 UTC timestamp with millisecond precision.
    pub fn timestamp(&self) -> String {
        self.now.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Continue,
    Reject(Rejection),
}

impl<E: Into<Rejection>> From<Result<(), E>> for StageOutcome {
    fn from(value: Result<(), E>) -> Self {
        match value {
            Ok(()) => StageOutcome::Continue,
            Err(e) => StageOutcome::Reject(e.into()),
        }
    }
}

/// A synchronous check (and optional annotation) of a request body.
///
/// Stages must not perform IO.
pub trait ValidationStage: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn applies_to(&self, target: &RequestTarget<'_>) -> bool;

    fn check(&self, body: &mut Body, ctx: &StageContext) -> StageOutcome;
}

#[derive(Default)]
pub struct ValidationPipeline {
    stages: Vec<Box<dyn ValidationStage>>,
}

impl ValidationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: impl ValidationStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Run every applicable stage in order.
    pub fn run(
        &self,
        target: &RequestTarget<'_>,
        body: &mut Body,
        ctx: &StageContext,
    ) -> Result<(), Rejection> {
        for stage in self.stages.iter().filter(|s| s.applies_to(target)) {
            if let StageOutcome::Reject(rejection) = stage.check(body, ctx) {
                tracing::debug!(
                    stage = stage.name(),
                    verb = %target.verb,
                    path = target.path,
                    reason = %rejection,
                    "request body rejected"
                );
                return Err(rejection);
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.name()))
            .finish()
    }
}
