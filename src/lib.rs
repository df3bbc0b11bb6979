//! Minimal HTTP server exposing a single process status endpoint.
//!
//! `GET [prefix]/status` returns:
//!
//! ```text
//! {
//!   "Birth": "2026-10-16T09:12:44.101Z",
//!   "CWD": "/srv/app",
//!   "GoroutineCount": 3,
//!   "GOMAXPROCS": 8,
//!   "GOGC": "",
//!   "GODEBUG": ""
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`route`]: Router wrapper tagging requests with their logical path
//! - [`runtime`]: Runtime counters behind a capability trait
//! - [`api`]: Status handler, routes and the web handler
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod route;
pub mod runtime;
pub mod utils;

pub use config::{Config, Options};
pub use error::{Result, ServerError};
