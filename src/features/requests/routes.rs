use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::requests::handlers;
use crate::features::requests::services::RequestService;

/// Create routes for the requests feature
pub fn routes(service: Arc<RequestService>) -> Router {
    Router::new()
        .route(
            "/api/requests",
            get(handlers::list_requests).post(handlers::create_request),
        )
        .route(
            "/api/requests/{id}",
            get(handlers::get_request).patch(handlers::update_request),
        )
        .route("/api/requests/{id}/submit", post(handlers::submit_request))
        .with_state(service)
}
