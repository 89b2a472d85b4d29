//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, uploads, validation pipeline and access rules
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request body extraction (JSON or multipart upload)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config)?);
    Ok(router_with_services(services, config))
}

/// Build the router around already-constructed services.
///
/// Files under the static root win; everything else falls through to the API.
pub fn router_with_services(services: Arc<services::AppServices>, config: &AppConfig) -> Router {
    let jwt = Arc::new(shopfront_auth::Hs256JwtValidator::new(
        config.jwt_secret.as_bytes().to_vec(),
    ));
    let auth_state = middleware::AuthState { jwt };

    let resources = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(config.max_body_bytes));

    let api = Router::new()
        .route("/health", get(routes::system::health))
        .merge(resources);

    let site = ServeDir::new(&config.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(api);

    Router::new().fallback_service(site).layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::log_requests))
            .layer(cors_layer())
            .layer(no_cache(header::CACHE_CONTROL, "no-cache"))
            .layer(no_cache(header::PRAGMA, "no-cache"))
            .layer(no_cache(header::EXPIRES, "-1")),
    )
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn no_cache(
    name: header::HeaderName,
    value: &'static str,
) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}
