//! Ingress API handlers.
//!
//! These endpoints are called by the gateway bridge that holds the chat
//! platform connection.
//!
//! # Endpoints
//!
//! - `POST /events` – submit a create/update/delete event for mirroring

use axum::{Router, http::StatusCode, response::IntoResponse, routing::post};

use crate::state::AppState;

mod ingress;

/// Build the ingress router.
pub fn router() -> Router<AppState> {
    Router::new().route("/events", post(ingress::submit_event))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in ingress handlers.
#[derive(Debug)]
enum IngressError {
    /// The mirror engine runner is gone (shutting down).
    EventChannelClosed,
}

impl IntoResponse for IngressError {
    fn into_response(self) -> axum::response::Response {
        match self {
            IngressError::EventChannelClosed => {
                tracing::error!("Ingress: event channel closed");
                (StatusCode::SERVICE_UNAVAILABLE, "relay is shutting down").into_response()
            }
        }
    }
}
