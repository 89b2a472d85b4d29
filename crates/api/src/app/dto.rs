//! Request body extraction.
//!
//! Write endpoints accept either a JSON object or `multipart/form-data`.
//! Multipart text fields become string fields of the body; file fields are
//! written to the image store first and recorded as `imageFilename`, so
//! validation always sees a plain JSON object.

use std::sync::Arc;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::Value;

use shopfront_core::Body;
use shopfront_infra::ImageStore;

use crate::app::errors;
use crate::app::services::AppServices;

const IMAGE_FILENAME: &str = "imageFilename";

/// A request body normalised to a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody(pub Body);

#[async_trait]
impl<S> FromRequest<S> for RequestBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let services = req
                .extensions()
                .get::<Arc<AppServices>>()
                .cloned()
                .ok_or_else(|| {
                    errors::json_error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "misconfigured",
                        "upload storage is not available",
                    )
                })?;
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return read_multipart(multipart, &services.images)
                .await
                .map(RequestBody);
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        parse_json_object(&bytes).map(RequestBody)
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

/// An empty body is an empty object; anything else must be a JSON object.
pub fn parse_json_object(bytes: &[u8]) -> Result<Body, Response> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Body::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(body)) => Ok(body),
        Ok(_) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_body",
            "request body must be a JSON object",
        )),
        Err(e) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_json",
            e.to_string(),
        )),
    }
}

fn multipart_error(err: MultipartError) -> Response {
    errors::json_error(StatusCode::BAD_REQUEST, "invalid_multipart", err.to_string())
}

async fn read_multipart(mut multipart: Multipart, images: &ImageStore) -> Result<Body, Response> {
    let mut body = Body::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(original) => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // Browsers send an empty part for an untouched file input.
                if original.is_empty() && bytes.is_empty() {
                    continue;
                }
                let stored = images
                    .save(&original, &bytes, Utc::now())
                    .await
                    .map_err(errors::upload_error_to_response)?;
                body.insert(IMAGE_FILENAME.to_string(), Value::String(stored));
            }
            None => {
                let text = field.text().await.map_err(multipart_error)?;
                if !name.is_empty() {
                    body.insert(name, Value::String(text));
                }
            }
        }
    }

    Ok(body)
}
