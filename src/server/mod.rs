pub mod handlers;
pub mod middleware;
pub mod proxy;

use std::sync::Arc;

use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::upstream::Upstream;

use self::handlers::AppState;

/// Build the axum router: one relay route plus a health check.
pub fn build_router(
    upstream: Arc<dyn Upstream>,
    http_client: reqwest::Client,
    cors_enabled: bool,
) -> Router {
    let state = Arc::new(AppState {
        upstream,
        http_client,
    });

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/complete",
            post(handlers::forward)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        );

    if cors_enabled {
        router = router.layer(axum_middleware::from_fn(middleware::cors_middleware));
    }

    router
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .with_state(state)
}
