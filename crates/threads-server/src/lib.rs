//! REST API server for private two-party message threads.
//!
//! The binary wraps this library with management commands; integration tests
//! drive [`server::build_router`] in-process.

pub mod commands;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use server::{build_router, start_server, AppState};
