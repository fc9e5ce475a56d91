//! Routing module for the shopping list application

use crate::shopping_list::state::SharedState;
use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
    Router,
};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

/// Response header carrying the id assigned to each request
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState) -> Router {
    // Middleware: CORS, open to every origin
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([axum::http::header::LOCATION]);

    // Routes
    Router::new()
        .merge(crate::shopping_list::routes())
        .layer(axum::middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Middleware: tags the request with an id, logs its outcome and echoes the
/// id back in `x-request-id`.
async fn log_requests(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().simple().to_string();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();

    let span = tracing::info_span!("request", %request_id, %method, %uri);
    let mut res = next.run(req).instrument(span.clone()).await;

    let status = res.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    span.in_scope(|| {
        if status.is_client_error() || status.is_server_error() {
            tracing::warn!(status = status.as_u16(), elapsed_ms, "Request failed");
        } else {
            tracing::info!(status = status.as_u16(), elapsed_ms, "Request completed");
        }
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}
