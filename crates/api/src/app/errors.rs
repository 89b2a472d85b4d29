use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use shopfront_auth::AuthzError;
use shopfront_core::Rejection;
use shopfront_infra::{StoreError, UploadError};

/// Validation rejections keep their own body shape (`{error}` or a field map).
pub fn rejection_to_response(rejection: Rejection) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, axum::Json(rejection.to_json())).into_response()
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    match err {
        AuthzError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", err.to_string())
        }
        AuthzError::Forbidden { .. } => {
            json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::DuplicateId { .. } => {
            json_error(StatusCode::CONFLICT, "conflict", err.to_string())
        }
        StoreError::NotACollection(_) => {
            json_error(StatusCode::BAD_REQUEST, "not_a_collection", err.to_string())
        }
        StoreError::Io { .. }
        | StoreError::Corrupt(_)
        | StoreError::InvalidRoot
        | StoreError::Poisoned => {
            tracing::error!(error = %err, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
        }
    }
}

pub fn upload_error_to_response(err: UploadError) -> axum::response::Response {
    tracing::error!(error = %err, "upload failure");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "upload_error", err.to_string())
}

pub fn not_found(resource: &str, id: &str) -> axum::response::Response {
    json_error(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("no record {id} in '{resource}'"),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
