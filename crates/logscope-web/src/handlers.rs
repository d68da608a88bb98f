//! HTTP request handlers for the web pages.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use serde::Deserialize;

use logscope_logs::process_dir;

use crate::error::{WebError, WebResult};
use crate::render::{self, ViewPage};
use crate::state::AppState;

/// Page size when the query does not provide a usable one
const DEFAULT_LIMIT: usize = 500;

/// Number of newest records to skip by default
const DEFAULT_OFFSET: usize = 0;

/// Default pager stride
const DEFAULT_STEP: usize = 500;

/// Stylesheet served at /static/style.css
const STYLE_CSS: &str = include_str!("../static/style.css");

/// Query parameters of the view pages.
///
/// Values are kept as raw strings; anything that does not parse as a
/// non-negative number falls back to its default instead of failing the
/// request.
#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    limit: Option<String>,
    offset: Option<String>,
    step: Option<String>,
}

impl ViewQuery {
    fn page(&self) -> (usize, usize, usize) {
        (
            parse_or(self.limit.as_deref(), DEFAULT_LIMIT),
            parse_or(self.offset.as_deref(), DEFAULT_OFFSET),
            parse_or(self.step.as_deref(), DEFAULT_STEP),
        )
    }
}

fn parse_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// Handle GET / - configured directories and rule sets
pub async fn index(State(state): State<AppState>) -> WebResult<Html<String>> {
    let config = state.load_config()?;
    Ok(Html(render::index_page(&config)))
}

/// Handle GET /view/{dir} - browse a directory without a rule set
pub async fn view_dir(
    State(state): State<AppState>,
    Path(dir): Path<String>,
    Query(query): Query<ViewQuery>,
) -> WebResult<Html<String>> {
    view(state, dir, String::new(), query).await
}

/// Handle GET /view/{dir}/{rule_set} - browse a directory through a rule set
pub async fn view_dir_rule_set(
    State(state): State<AppState>,
    Path((dir, rule_set)): Path<(String, String)>,
    Query(query): Query<ViewQuery>,
) -> WebResult<Html<String>> {
    view(state, dir, rule_set, query).await
}

async fn view(
    state: AppState,
    dir: String,
    rule_set: String,
    query: ViewQuery,
) -> WebResult<Html<String>> {
    let config = state.load_config()?;
    let path = state.resolve_dir(&dir)?;
    let (limit, offset, step) = query.page();

    // The scan walks the file system line by line, so hand it to a blocking
    // thread instead of stalling the runtime.
    let rule = config.resolve_rule(&dir, &rule_set).cloned();
    let registry = state.registry();
    let records = tokio::task::spawn_blocking(move || {
        process_dir(&path, rule.as_ref(), &registry, limit, offset)
    })
    .await
    .map_err(|err| WebError::Internal(err.to_string()))??;

    Ok(Html(render::view_page(&ViewPage {
        dir: &dir,
        rule_set: &rule_set,
        rule_set_names: config.rule_set_names(),
        dir_rule_set_names: config.dir_rule_set_names(&dir),
        limit,
        offset,
        step,
        records: &records,
    })))
}

/// Handle GET /static/style.css
pub async fn style() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLE_CSS,
    )
}
