//! Web handler owning the server options and process state.

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use super::handlers::AppState;
use super::routes::{apply_limits, create_router};
use crate::config::Options;
use crate::error::{Result, ServerError};
use crate::runtime::{RuntimeStats, TokioRuntimeStats};
use crate::utils::shutdown_signal;

/// Serves the HTTP endpoints.
pub struct WebHandler {
    options: Options,
    state: AppState,
}

impl WebHandler {
    /// Create a handler reading counters from the current tokio runtime.
    pub fn new(options: Options) -> Self {
        Self::with_runtime_stats(options, Arc::new(TokioRuntimeStats))
    }

    /// Create a handler with a custom [`RuntimeStats`] source.
    pub fn with_runtime_stats(options: Options, stats: Arc<dyn RuntimeStats>) -> Self {
        let state = AppState::new(stats).with_redacted_tuning_knobs(options.redact_tuning_knobs);
        Self { options, state }
    }

    /// Options this handler was built with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Shared state handed to request handlers.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the full router with all layers applied.
    pub fn router(&self) -> axum::Router {
        let router = create_router(self.state.clone(), &self.options.route_prefix);
        apply_limits(router, &self.options)
    }

    /// Bind the configured address and serve until a shutdown signal arrives.
    pub async fn run(self) -> Result<()> {
        let address = self.options.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind { address, source })?;

        info!(
            address = %self.options.listen_address,
            "Start listening for connections"
        );
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` completes.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.options.redact_tuning_knobs {
            warn!("Status endpoint exposes tuning knob environment variables; set REDACT_TUNING_KNOBS=true to hide them");
        }
        info!(
            route_prefix = %self.options.route_prefix,
            external_url = ?self.options.external_url.as_ref().map(|u| u.as_str()),
            page_title = %self.options.page_title,
            max_connections = self.options.max_connections,
            read_timeout_secs = self.options.read_timeout.as_secs(),
            "Serving status endpoint"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server stopped");
        Ok(())
    }
}
