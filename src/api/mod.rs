//! Site bandwidth data API
//!
//! Read-only HTTP views over the cached load result.
//! Run with `sitebw-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
