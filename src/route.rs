//! Router wrapper that tags each request with its logical path.
//!
//! Every handler registered on a [`Router`] is decorated so that, before it
//! runs, a [`RequestContext`] holding `prefix + uri.path()` is attached to the
//! request. Handlers receive it explicitly through the extractor.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::Response,
    routing::{get, MethodRouter},
};
use tracing::{debug, info_span, Instrument};

/// Per-request context populated by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Logical path: route prefix followed by the URL path.
    pub path: String,
    /// Pattern the handler was registered under.
    pub route: &'static str,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Handlers mounted outside a `Router` still get their plain path.
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(|| RequestContext {
                path: parts.uri.path().to_string(),
                route: "",
            }))
    }
}

#[derive(Debug)]
struct PathTag {
    prefix: String,
    route: &'static str,
}

/// Thin wrapper over [`axum::Router`] that instruments each registered route.
#[derive(Debug)]
pub struct Router<S = ()> {
    inner: axum::Router<S>,
    prefix: String,
}

impl<S> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Create a router with no path prefix.
    pub fn new() -> Self {
        Self {
            inner: axum::Router::new(),
            prefix: String::new(),
        }
    }

    /// Prepend `prefix` to the logical path of routes registered afterwards.
    pub fn with_instrumentation(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Register a GET handler for `pattern`.
    pub fn get<H, T>(self, pattern: &'static str, handler: H) -> Self
    where
        H: axum::handler::Handler<T, S>,
        T: 'static,
    {
        self.route(pattern, get(handler))
    }

    /// Register a method router for `pattern`, decorated with the path tag.
    pub fn route(mut self, pattern: &'static str, method_router: MethodRouter<S>) -> Self {
        let tag = Arc::new(PathTag {
            prefix: self.prefix.clone(),
            route: pattern,
        });
        let decorated = method_router.layer(middleware::from_fn_with_state(tag, set_path));
        self.inner = self.inner.route(pattern, decorated);
        self
    }

    /// Provide the state and convert into a plain axum router.
    pub fn with_state<S2>(self, state: S) -> axum::Router<S2> {
        self.inner.with_state(state)
    }

    /// Convert into the underlying axum router without providing state.
    pub fn into_inner(self) -> axum::Router<S> {
        self.inner
    }
}

impl<S> Default for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

async fn set_path(State(tag): State<Arc<PathTag>>, mut request: Request, next: Next) -> Response {
    let path = format!("{}{}", tag.prefix, request.uri().path());
    debug!(path = %path, route = tag.route, "Dispatching request");

    let span = info_span!("request", path = %path, method = %request.method());
    request.extensions_mut().insert(RequestContext {
        path,
        route: tag.route,
    });

    next.run(request).instrument(span).await
}
