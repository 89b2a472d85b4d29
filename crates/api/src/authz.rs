//! API-side access-rule enforcement.
//!
//! Runs after body validation and before the store is touched.

use axum::http::StatusCode;
use axum::response::Response;

use shopfront_auth::{AccessRules, Authorization, Operation, authorize, owner_field};
use shopfront_core::Body;

use crate::app::errors;
use crate::context::CallerContext;

/// Check the access rules for an operation on a resource in the current request context.
pub fn authorize_request(
    rules: &AccessRules,
    resource: &str,
    operation: Operation,
    caller: &CallerContext,
) -> Result<Authorization, Response> {
    authorize(rules, resource, operation, caller.principal_id()).map_err(|e| {
        tracing::debug!(resource, %operation, error = %e, "access denied");
        errors::authz_error_to_response(e)
    })
}

/// Reject a record that lies outside an owner-restricted grant.
pub fn ensure_permits(
    grant: &Authorization,
    resource: &str,
    record: &Body,
) -> Result<(), Response> {
    if grant.permits(resource, record) {
        Ok(())
    } else {
        Err(forbidden_record(resource))
    }
}

/// A body may not hand a record to another owner.
///
/// Bodies that do not mention the owner field leave ownership unchanged.
pub fn ensure_keeps_owner(
    grant: &Authorization,
    resource: &str,
    body: &Body,
) -> Result<(), Response> {
    if body.contains_key(owner_field(resource)) {
        ensure_permits(grant, resource, body)
    } else {
        Ok(())
    }
}

/// Fill in the owner field from the stored record when the body leaves it out.
///
/// Keeps a wholesale replacement under an owner-restricted grant owned by
/// the same caller.
pub fn carry_owner(resource: &str, body: &mut Body, existing: &Body) {
    let field = owner_field(resource);
    if body.contains_key(field) {
        return;
    }
    if let Some(owner) = existing.get(field) {
        body.insert(field.to_string(), owner.clone());
    }
}

fn forbidden_record(resource: &str) -> Response {
    errors::json_error(
        StatusCode::FORBIDDEN,
        "forbidden",
        format!("record in '{resource}' belongs to another user"),
    )
}
