//! End-to-end tests for the status server.
//!
//! Each test binds an ephemeral port, serves the real router and talks to it
//! over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use ng_status::api::{StatusResponse, WebHandler};
use ng_status::config::Options;
use ng_status::route::{RequestContext, Router};
use ng_status::runtime::{RuntimeStats, TokioRuntimeStats, KNOB_DEBUG, KNOB_GC};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serve `handler` on an ephemeral port. Dropping the sender stops it.
async fn spawn_handler(handler: WebHandler) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        handler
            .serve(listener, async {
                rx.await.ok();
            })
            .await
            .unwrap();
    });

    (addr, tx)
}

/// Live runtime counters with both tuning knobs unset.
struct UnsetKnobs;

impl RuntimeStats for UnsetKnobs {
    fn concurrency_unit_count(&self) -> usize {
        TokioRuntimeStats.concurrency_unit_count()
    }

    fn parallelism(&self) -> usize {
        TokioRuntimeStats.parallelism()
    }

    fn tuning_knob(&self, _name: &str) -> String {
        String::new()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn status_reports_runtime_with_unset_knobs() {
    let handler = WebHandler::with_runtime_stats(Options::default(), Arc::new(UnsetKnobs));
    let (addr, _shutdown) = spawn_handler(handler).await;
    let url = format!("http://{addr}/status");

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers()[reqwest::header::CONTENT_TYPE],
        "application/json"
    );

    let first: StatusResponse = response.json().await.unwrap();
    assert_eq!(first.gogc, "");
    assert_eq!(first.godebug, "");
    assert_eq!(first.gomaxprocs, 2);
    assert!(first.goroutine_count >= 1);

    for _ in 0..3 {
        let next: StatusResponse = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(next.birth, first.birth);
        assert_eq!(next.cwd, first.cwd);
        assert!(next.goroutine_count >= 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn status_reads_knobs_from_process_environment() {
    let (addr, _shutdown) = spawn_handler(WebHandler::new(Options::default())).await;

    let status: StatusResponse = reqwest::get(format!("http://{addr}/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status.gogc, std::env::var(KNOB_GC).unwrap_or_default());
    assert_eq!(status.godebug, std::env::var(KNOB_DEBUG).unwrap_or_default());
    assert_eq!(status.gomaxprocs, 2);
    assert!(status.goroutine_count >= 1);
}

#[tokio::test]
async fn status_is_served_under_route_prefix() {
    let options = Options {
        route_prefix: "/api".to_string(),
        ..Options::default()
    };
    let (addr, _shutdown) = spawn_handler(WebHandler::new(options)).await;

    let ok = reqwest::get(format!("http://{addr}/api/status")).await.unwrap();
    assert_eq!(ok.status(), reqwest::StatusCode::OK);

    let missing = reqwest::get(format!("http://{addr}/status")).await.unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logical_path_includes_route_prefix() {
    async fn logical_path(ctx: RequestContext) -> String {
        ctx.path
    }

    let inner = Router::<()>::new()
        .with_instrumentation("/api")
        .get("/status", logical_path)
        .into_inner();
    let mounted = axum::Router::new().nest("/api", inner.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mounted_addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, mounted).await });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let proxied_addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, inner).await });

    let mounted = reqwest::get(format!("http://{mounted_addr}/api/status"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(mounted, "/api/status");

    // Behind a proxy that strips the prefix.
    let proxied = reqwest::get(format!("http://{proxied_addr}/status"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(proxied, "/api/status");
}

#[tokio::test]
async fn redacted_knobs_are_empty() {
    let options = Options {
        redact_tuning_knobs: true,
        ..Options::default()
    };
    let (addr, _shutdown) = spawn_handler(WebHandler::new(options)).await;

    let body: serde_json::Value = reqwest::get(format!("http://{addr}/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["GOGC"], serde_json::json!(""));
    assert_eq!(body["GODEBUG"], serde_json::json!(""));
}
