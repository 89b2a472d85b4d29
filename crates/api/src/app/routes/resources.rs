//! Generic CRUD over the collections of the document store.
//!
//! Write requests run in a fixed order: body extraction (uploads included),
//! the validation pipeline, access rules, then the store.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde_json::Value;

use shopfront_auth::Operation;
use shopfront_core::{Body, RecordId, RequestTarget, StageContext, Verb};
use shopfront_infra::{DocumentStore, StoreError};

use crate::app::dto::RequestBody;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/:resource", get(list_records).post(create_record))
        .route(
            "/:resource/:id",
            get(get_record)
                .put(replace_record)
                .patch(patch_record)
                .delete(delete_record),
        )
}

/// Run the validation pipeline for a body aimed at `path`.
fn validate(
    services: &AppServices,
    verb: Verb,
    path: &str,
    body: &mut Body,
) -> Result<(), Response> {
    let ctx = StageContext::new(Utc::now());
    services
        .pipeline
        .run(&RequestTarget::new(verb, path), body, &ctx)
        .map_err(errors::rejection_to_response)
}

/// Run a store mutation on the blocking pool; the file-backed store writes synchronously.
async fn mutate_store<R>(
    services: &AppServices,
    op: impl FnOnce(&dyn DocumentStore) -> Result<R, StoreError> + Send + 'static,
) -> Result<R, Response>
where
    R: Send + 'static,
{
    let store = Arc::clone(&services.store);
    tokio::task::spawn_blocking(move || op(&*store))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "store task failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "store task failed",
            )
        })?
        .map_err(errors::store_error_to_response)
}

/// Equality filters from the query string, compared against the field's text form.
fn matches_filters(record: &Body, filters: &HashMap<String, String>) -> bool {
    filters.iter().all(|(field, expected)| match record.get(field) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == *expected,
        None => false,
    })
}

pub async fn list_records(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(resource): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
) -> Response {
    let grant = match authz::authorize_request(&services.rules, &resource, Operation::Read, &caller) {
        Ok(g) => g,
        Err(resp) => return resp,
    };

    let records = match services.store.list(&resource) {
        Ok(r) => r,
        Err(e) => return errors::store_error_to_response(e),
    };

    let items = records
        .into_iter()
        .filter(|r| grant.permits(&resource, r))
        .filter(|r| matches_filters(r, &filters))
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(items)).into_response()
}

pub async fn get_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    let grant = match authz::authorize_request(&services.rules, &resource, Operation::Read, &caller) {
        Ok(g) => g,
        Err(resp) => return resp,
    };

    let id = RecordId::new(id);
    match services.store.get(&resource, &id) {
        Ok(Some(record)) => match authz::ensure_permits(&grant, &resource, &record) {
            Ok(()) => (StatusCode::OK, Json(record)).into_response(),
            Err(resp) => resp,
        },
        Ok(None) => errors::not_found(&resource, id.as_str()),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(resource): Path<String>,
    RequestBody(mut body): RequestBody,
) -> Response {
    if let Err(resp) = validate(&services, Verb::Post, &format!("/{resource}"), &mut body) {
        return resp;
    }

    let grant = match authz::authorize_request(&services.rules, &resource, Operation::Write, &caller) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    if let Err(resp) = authz::ensure_permits(&grant, &resource, &body) {
        return resp;
    }

    let collection = resource.clone();
    match mutate_store(&services, move |store| store.insert(&collection, body)).await {
        Ok(record) => {
            tracing::info!(resource = %resource, id = ?record.get("id"), "record created");
            (StatusCode::CREATED, Json(record)).into_response()
        }
        Err(resp) => resp,
    }
}

/// Shared path of PUT and PATCH: validate, authorize, check ownership of the stored record.
///
/// Under an owner-restricted grant the stored owner is kept when the body omits it.
fn prepare_update(
    services: &AppServices,
    caller: &CallerContext,
    verb: Verb,
    resource: &str,
    id: &RecordId,
    body: &mut Body,
) -> Result<(), Response> {
    validate(services, verb, &format!("/{resource}/{id}"), body)?;

    let grant = authz::authorize_request(&services.rules, resource, Operation::Write, caller)?;
    authz::ensure_keeps_owner(&grant, resource, body)?;

    if grant.is_restricted() {
        match services.store.get(resource, id) {
            Ok(Some(existing)) => {
                authz::ensure_permits(&grant, resource, &existing)?;
                authz::carry_owner(resource, body, &existing);
            }
            Ok(None) => return Err(errors::not_found(resource, id.as_str())),
            Err(e) => return Err(errors::store_error_to_response(e)),
        }
    }
    Ok(())
}

pub async fn replace_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((resource, id)): Path<(String, String)>,
    RequestBody(mut body): RequestBody,
) -> Response {
    let id = RecordId::new(id);
    if let Err(resp) = prepare_update(&services, &caller, Verb::Put, &resource, &id, &mut body) {
        return resp;
    }

    let (collection, target) = (resource.clone(), id.clone());
    match mutate_store(&services, move |store| store.replace(&collection, &target, body)).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => errors::not_found(&resource, id.as_str()),
        Err(resp) => resp,
    }
}

pub async fn patch_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((resource, id)): Path<(String, String)>,
    RequestBody(mut body): RequestBody,
) -> Response {
    let id = RecordId::new(id);
    if let Err(resp) = prepare_update(&services, &caller, Verb::Patch, &resource, &id, &mut body) {
        return resp;
    }

    let (collection, target) = (resource.clone(), id.clone());
    match mutate_store(&services, move |store| store.merge(&collection, &target, body)).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => errors::not_found(&resource, id.as_str()),
        Err(resp) => resp,
    }
}

pub async fn delete_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    let grant = match authz::authorize_request(&services.rules, &resource, Operation::Write, &caller) {
        Ok(g) => g,
        Err(resp) => return resp,
    };

    let id = RecordId::new(id);
    if grant.is_restricted() {
        match services.store.get(&resource, &id) {
            Ok(Some(existing)) => {
                if let Err(resp) = authz::ensure_permits(&grant, &resource, &existing) {
                    return resp;
                }
            }
            Ok(None) => return errors::not_found(&resource, id.as_str()),
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    let (collection, target) = (resource.clone(), id.clone());
    match mutate_store(&services, move |store| store.remove(&collection, &target)).await {
        Ok(Some(_)) => {
            tracing::info!(resource = %resource, id = %id, "record deleted");
            (StatusCode::OK, Json(serde_json::json!({}))).into_response()
        }
        Ok(None) => errors::not_found(&resource, id.as_str()),
        Err(resp) => resp,
    }
}
