//! HTTP API route definitions.

use axum::http::{header::HeaderValue, request::Parts, Method};
use regex::Regex;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
};

use super::handlers::{status, AppState};
use crate::config::Options;
use crate::route::Router;

/// Create the API router, mounted under `route_prefix` when it is set.
pub fn create_router(state: AppState, route_prefix: &str) -> axum::Router {
    let router = Router::new()
        .with_instrumentation(route_prefix)
        .get("/status", status)
        .with_state(state);

    if route_prefix.is_empty() {
        router
    } else {
        axum::Router::new().nest(route_prefix, router)
    }
}

/// Wrap `router` with the connection-level layers described by `options`.
pub fn apply_limits(mut router: axum::Router, options: &Options) -> axum::Router {
    if let Some(origin) = &options.cors_origin {
        router = router.layer(cors_layer(origin.clone()));
    }

    // Bounds in-flight requests; idle keep-alive connections hold no permit.
    if options.max_connections > 0 {
        router = router.layer(GlobalConcurrencyLimitLayer::new(options.max_connections));
    }

    router.layer(TimeoutLayer::new(options.read_timeout))
}

fn cors_layer(origin: Regex) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |value: &HeaderValue, _parts: &Parts| {
                value
                    .to_str()
                    .map(|o| origin.is_match(o))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::OPTIONS])
}
