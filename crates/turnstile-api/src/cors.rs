//! Permissive CORS.
//!
//! Every response gets `Access-Control-Allow-Origin: *`. Preflight
//! (`OPTIONS`) requests are answered by the CORS layer and never reach a
//! handler; their status is rewritten to `204 No Content`.

use std::time::Duration;

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::cors::{Any, CorsLayer};

/// Any origin, the methods this API serves, any request header.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(86400))
}

/// `CorsLayer` answers preflights with 200; report them as 204.
///
/// Must sit outside [`cors_layer`] so it sees the preflight response.
pub async fn preflight_no_content(req: Request, next: Next) -> Response {
    let preflight = req.method() == Method::OPTIONS;
    let mut resp = next.run(req).await;
    if preflight && resp.status() == StatusCode::OK {
        *resp.status_mut() = StatusCode::NO_CONTENT;
    }
    resp
}
