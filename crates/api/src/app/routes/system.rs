use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::errors;
use crate::context::CallerContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(caller): Extension<CallerContext>) -> axum::response::Response {
    match caller.principal() {
        Some(principal) => Json(serde_json::json!({
            "id": principal.principal_id().as_str(),
            "email": principal.email(),
        }))
        .into_response(),
        None => errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "no bearer token"),
    }
}
