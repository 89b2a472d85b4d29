use axum::{Router, routing::get};

pub mod resources;
pub mod system;

/// Router for every endpoint behind the caller-resolving middleware.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(resources::router())
}
