//! Route configuration for the web interface.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers::{index, style, view_dir, view_dir_rule_set};
use crate::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Landing page
        .route("/", get(index))
        // Directory views
        .route("/view/{dir}", get(view_dir))
        .route("/view/{dir}/{rule_set}", get(view_dir_rule_set))
        // Static assets
        .route("/static/style.css", get(style))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
