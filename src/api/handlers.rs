//! HTTP API handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, error};

use crate::route::RequestContext;
use crate::runtime::{RuntimeStats, KNOB_DEBUG, KNOB_GC};

/// Placeholder reported when the working directory cannot be determined.
pub const CWD_UNAVAILABLE: &str = "<error retrieving current working directory>";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server start time, UTC.
    pub birth: OffsetDateTime,
    /// Working directory captured at startup.
    pub cwd: Arc<str>,
    /// Runtime counters.
    pub stats: Arc<dyn RuntimeStats>,
    /// Report tuning knobs as empty strings.
    pub redact_tuning_knobs: bool,
}

impl AppState {
    /// Capture birth time and working directory now.
    pub fn new(stats: Arc<dyn RuntimeStats>) -> Self {
        Self {
            birth: OffsetDateTime::now_utc(),
            cwd: resolve_cwd(std::env::current_dir()).into(),
            stats,
            redact_tuning_knobs: false,
        }
    }

    /// Hide tuning knob values from status responses.
    pub fn with_redacted_tuning_knobs(mut self, redact: bool) -> Self {
        self.redact_tuning_knobs = redact;
        self
    }

    /// Build a fresh snapshot of process state.
    pub fn snapshot(&self) -> StatusResponse {
        let knob = |name: &str| {
            if self.redact_tuning_knobs {
                String::new()
            } else {
                self.stats.tuning_knob(name)
            }
        };

        StatusResponse {
            birth: self.birth,
            cwd: self.cwd.to_string(),
            goroutine_count: self.stats.concurrency_unit_count(),
            gomaxprocs: self.stats.parallelism(),
            gogc: knob(KNOB_GC),
            godebug: knob(KNOB_DEBUG),
        }
    }
}

/// Render the working directory, substituting a placeholder on failure.
pub fn resolve_cwd(result: io::Result<PathBuf>) -> String {
    match result {
        Ok(dir) => dir.display().to_string(),
        Err(e) => {
            error!(error = %e, "Failed to determine working directory");
            CWD_UNAVAILABLE.to_string()
        }
    }
}

/// Status response. Field names are part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server start time.
    #[serde(rename = "Birth", with = "time::serde::rfc3339")]
    pub birth: OffsetDateTime,
    /// Working directory.
    #[serde(rename = "CWD")]
    pub cwd: String,
    /// Live concurrency units.
    #[serde(rename = "GoroutineCount")]
    pub goroutine_count: usize,
    /// Configured parallelism.
    #[serde(rename = "GOMAXPROCS")]
    pub gomaxprocs: usize,
    /// GC pacing knob.
    #[serde(rename = "GOGC")]
    pub gogc: String,
    /// Debug settings knob.
    #[serde(rename = "GODEBUG")]
    pub godebug: String,
}

/// Status handler - returns a snapshot of process state.
pub async fn status(State(state): State<AppState>, ctx: RequestContext) -> Response {
    debug!(path = %ctx.path, "Serving status");
    json_response(&state.snapshot())
}

/// Encode `value` as a JSON response, or a plain-text 500 if encoding fails.
pub fn json_response<T: Serialize>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode JSON response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("error encoding JSON: {e}"),
            )
                .into_response()
        }
    }
}
