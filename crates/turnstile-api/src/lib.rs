//! turnstile-api — HTTP surface for Turnstile.
//!
//! Provides axum route handlers for round-robin routing, the internal
//! counter service, and daily/explicit content lookup. Each group is only
//! mounted when its backing component is present, so the same router
//! serves the all-in-one, counter-only and edge process modes.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/route?message=` | Next channel in rotation |
//! | POST | `/internal/counters/{name}/increment` | Increment-and-fetch |
//! | GET | `/internal/counters/{name}` | Current counter value |
//! | GET | `/api/verse/daily?date=YYYY-MM-DD` | Record for a date |
//! | GET | `/api/verse?ref=` / `?book=&chapter=&verse=` | Explicit lookup |
//! | GET | `/healthz` | Liveness |

pub mod content_handlers;
pub mod cors;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use turnstile_core::Corpus;
use turnstile_router::RoundRobinRouter;
use turnstile_state::CounterHandle;

/// Components served by this process. Absent parts are not mounted.
#[derive(Clone, Default)]
pub struct ApiState {
    pub routing: Option<Arc<RoundRobinRouter>>,
    pub counters: Option<CounterHandle>,
    pub content: Option<Corpus>,
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    let mut app = Router::new().route("/healthz", get(handlers::healthz));

    if let Some(routing) = state.routing {
        app = app.merge(
            Router::new()
                .route("/api/route", get(handlers::route_request))
                .with_state(routing),
        );
    }

    if let Some(counters) = state.counters {
        let counter_routes = Router::new()
            .route("/{name}", get(handlers::peek_counter))
            .route("/{name}/increment", post(handlers::increment_counter))
            .with_state(counters);
        app = app.nest("/internal/counters", counter_routes);
    }

    if let Some(corpus) = state.content {
        app = app.merge(
            Router::new()
                .route("/api/verse", get(content_handlers::lookup_verse))
                .route("/api/verse/daily", get(content_handlers::daily_verse))
                .with_state(corpus),
        );
    }

    app.layer(cors::cors_layer())
        .layer(middleware::from_fn(cors::preflight_no_content))
}
