//! Landing page.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use tokio::fs;

use crate::error::ApiError;
use crate::state::AppState;
use crate::ws::{upgrade_listener, ListenParams};

/// `GET /`: the client page, or a progress listener when the request is a
/// WebSocket upgrade (the browser client connects to the page origin).
pub async fn index(
    State(state): State<AppState>,
    ws: Option<WebSocketUpgrade>,
    Query(params): Query<ListenParams>,
) -> Response {
    if let Some(ws) = ws {
        return upgrade_listener(ws, state, params);
    }

    let path = state.storage.landing_page();
    match fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => ApiError::not_found("Landing page not found").into_response(),
    }
}
