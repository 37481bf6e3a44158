//! Routing, counter and health handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::warn;

use turnstile_core::RoutingResult;
use turnstile_router::RoundRobinRouter;
use turnstile_state::CounterHandle;

/// Structured error payload shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

pub(crate) fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ErrorBody {
            error: msg.to_string(),
            status: status.as_u16(),
        }),
    )
        .into_response()
}

// ── Health ─────────────────────────────────────────────────────

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ── Routing ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RouteQuery {
    pub message: Option<String>,
}

/// GET /api/route
///
/// Always 200. A degraded decision is flagged in the body, not the status.
pub async fn route_request(
    State(router): State<Arc<RoundRobinRouter>>,
    query: Result<Query<RouteQuery>, QueryRejection>,
) -> Json<RoutingResult> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    Json(router.route(query.message.as_deref()).await)
}

// ── Counters ───────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CounterValue {
    pub value: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub name: String,
    pub value: u64,
}

/// POST /internal/counters/{name}/increment
pub async fn increment_counter(
    State(counters): State<CounterHandle>,
    Path(name): Path<String>,
) -> Response {
    match counters.increment_and_fetch(&name).await {
        Ok(value) => Json(CounterValue { value }).into_response(),
        Err(e) => {
            warn!(error = %e, counter = %name, "increment failed");
            error_response(&e.to_string(), StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// GET /internal/counters/{name}
pub async fn peek_counter(
    State(counters): State<CounterHandle>,
    Path(name): Path<String>,
) -> Response {
    match counters.peek(&name).await {
        Ok(value) => Json(CounterSnapshot { name, value }).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::SERVICE_UNAVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnstile_core::config::RoutingConfig;
    use turnstile_router::LocalSequence;
    use turnstile_state::{CounterActor, CounterStore};

    fn counter_handle() -> CounterHandle {
        let (handle, _task) = CounterActor::spawn(CounterStore::open_in_memory().unwrap());
        handle
    }

    fn test_router(handle: CounterHandle) -> Arc<RoundRobinRouter> {
        let config = RoutingConfig {
            channels: vec!["+111".to_string(), "+222".to_string()],
            default_message: "Hola".to_string(),
            counter_name: "global".to_string(),
            counter_timeout_ms: 500,
        };
        Arc::new(RoundRobinRouter::new(&config, Arc::new(LocalSequence::new(handle))).unwrap())
    }

    #[tokio::test]
    async fn healthz_ok() {
        let resp = healthz().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn route_request_alternates() {
        let router = test_router(counter_handle());

        let Json(first) = route_request(State(router.clone()), Ok(Query(RouteQuery::default()))).await;
        let Json(second) = route_request(State(router), Ok(Query(RouteQuery::default()))).await;
        assert_eq!((first.index, second.index), (0, 1));
        assert!(!first.degraded && !second.degraded);
    }

    #[tokio::test]
    async fn route_request_passes_message() {
        let router = test_router(counter_handle());
        let query = RouteQuery {
            message: Some("hola amigo".to_string()),
        };
        let Json(result) = route_request(State(router), Ok(Query(query))).await;
        assert_eq!(result.wa_url, "https://wa.me/111?text=hola%20amigo");
    }

    #[tokio::test]
    async fn increment_returns_pre_increment_value() {
        let handle = counter_handle();

        let resp = increment_counter(State(handle.clone()), Path("global".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = increment_counter(State(handle.clone()), Path("global".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);

        assert_eq!(handle.peek("global").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn increment_on_stopped_actor_is_unavailable() {
        let (handle, task) = CounterActor::spawn(CounterStore::open_in_memory().unwrap());
        task.abort();
        let _ = task.await;

        let resp = increment_counter(State(handle), Path("global".to_string())).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn peek_unknown_counter_is_zero() {
        let resp = peek_counter(State(counter_handle()), Path("fresh".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
