//! Endpoints driven by the visual back-end: push a payload, then capture the page.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tales_core::{RenderKind, RenderPayload};
use tracing::{debug, error};

use crate::metrics::RENDER_PUSHES_TOTAL;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    /// Template to render with; defaults to the pushed payload's kind.
    pub kind: Option<String>,
}

/// Stores the payload shown by the next render.
pub async fn push(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RenderPayload>,
) -> StatusCode {
    debug!(kind = %payload.kind, chars = payload.revealed.len(), "Render payload pushed");
    state.push(payload).await;
    RENDER_PUSHES_TOTAL.inc();
    StatusCode::OK
}

/// Renders the current payload as an HTML page.
pub async fn render(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RenderQuery>,
) -> Response {
    let Some(mut payload) = state.current().await else {
        return (StatusCode::NOT_FOUND, "nothing pushed yet").into_response();
    };

    if let Some(kind) = query.kind.as_deref().filter(|k| !k.is_empty()) {
        match kind.parse::<RenderKind>() {
            Ok(kind) => payload.kind = kind,
            Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
        }
    }

    match state.renderer().render(&payload).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!(error = %e, kind = %payload.kind, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
