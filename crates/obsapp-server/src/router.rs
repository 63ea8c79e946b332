//! Axum router wiring.
//!
//! The metrics middleware is layered after every route (the metrics endpoint
//! included) so all of them, and the 404 fallback, are observed.

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{app_state::AppState, obs, ops};

pub fn build_router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(ops::root))
        .route("/health", get(ops::health));

    if state.metrics().is_some() {
        app = app
            .route(&state.cfg().metrics.endpoint, get(ops::metrics))
            .layer(middleware::from_fn_with_state(state.clone(), obs::track_metrics));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
