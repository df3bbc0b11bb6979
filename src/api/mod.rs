//! HTTP API module for the status endpoint.

pub mod handlers;
pub mod routes;
pub mod server;

pub use handlers::{AppState, StatusResponse};
pub use routes::create_router;
pub use server::WebHandler;
