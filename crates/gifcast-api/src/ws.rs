//! WebSocket progress listeners.
//!
//! The channel is server→client only: each socket forwards hub events until
//! either side goes away. Incoming messages other than Close are ignored.

use std::sync::atomic::{AtomicI64, Ordering};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, info};

use gifcast_models::ConversionId;

use crate::error::ApiError;
use crate::metrics;
use crate::services::ProgressSubscription;
use crate::state::AppState;

/// Global counter for active WebSocket connections.
static ACTIVE_WS_CONNECTIONS: AtomicI64 = AtomicI64::new(0);

/// Query parameters for a listener.
#[derive(Debug, Default, Deserialize)]
pub struct ListenParams {
    /// Only receive progress for this conversion
    pub conversion: Option<String>,
}

/// `GET /ws` WebSocket endpoint.
pub async fn ws_listen(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<ListenParams>,
) -> Response {
    upgrade_listener(ws, state, params)
}

/// Upgrade a request into a progress listener.
pub fn upgrade_listener(ws: WebSocketUpgrade, state: AppState, params: ListenParams) -> Response {
    let scope = match params.conversion.map(ConversionId::parse).transpose() {
        Ok(scope) => scope,
        Err(e) => {
            return ApiError::bad_request(format!("Invalid conversion: {}", e)).into_response();
        }
    };

    metrics::record_ws_connection(scope.is_some());

    ws.on_upgrade(move |socket| async move {
        // Subscribe only once the socket is open
        let subscription = state.progress.subscribe(scope);

        let count = ACTIVE_WS_CONNECTIONS.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_ws_active_connections(count);
        info!(
            scope = subscription.scope().map(|id| id.as_str()).unwrap_or("*"),
            active = count,
            "Progress listener connected"
        );

        forward_progress(socket, subscription).await;

        let count = ACTIVE_WS_CONNECTIONS.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_ws_active_connections(count);
        info!(active = count, "Progress listener disconnected");
    })
}

/// Forward hub events to one socket until it closes.
async fn forward_progress(mut socket: WebSocket, mut subscription: ProgressSubscription) {
    loop {
        tokio::select! {
            event = subscription.next() => {
                let Some(message) = event else { break };
                let json = match serde_json::to_string(&message) {
                    Ok(j) => j,
                    Err(_) => continue,
                };
                // A failed send only ends this listener
                if socket.send(Message::Text(json)).await.is_err() {
                    debug!("Progress listener send failed, closing");
                    break;
                }
                metrics::record_ws_message_sent(message.message_type().as_str());
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }
}
