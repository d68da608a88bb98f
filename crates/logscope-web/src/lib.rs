//! Web interface for logscope
//!
//! Serves the index and directory view pages, resolving rule sets from the
//! persisted configuration and scanning log directories per request.

mod config;
mod error;
mod handlers;
mod render;
mod routes;
mod server;
mod state;

pub use config::SavedConfig;
pub use error::WebError;
pub use routes::create_router;
pub use server::{serve, serve_with_shutdown};
pub use state::AppState;
