use axum::{Json, extract::State, http::StatusCode};
use dmm_core::events::MirrorEvent;
use dmm_sdk::objects::IngressEvent;

use super::IngressError;
use crate::state::AppState;

/// `POST /events` - queue one event for the mirror engine.
///
/// Returns `202 Accepted` as soon as the event is queued; relaying happens
/// asynchronously. Waits for channel capacity when the engine is behind.
pub(super) async fn submit_event(
    State(state): State<AppState>,
    Json(event): Json<IngressEvent>,
) -> Result<StatusCode, IngressError> {
    tracing::debug!(
        kind = %event.kind,
        message_id = %event.message.id,
        channel_id = %event.message.channel_id,
        "Received ingress event"
    );

    state
        .events
        .send(MirrorEvent::from(event))
        .await
        .map_err(|_| IngressError::EventChannelClosed)?;

    Ok(StatusCode::ACCEPTED)
}

#[cfg(test)]
mod tests {
    use crate::server::build_router;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use dmm_core::events::{MirrorEvent, mirror_event_channel};
    use dmm_core::resolution::ReadinessGate;
    use tower::ServiceExt;

    fn post_event(body: &str) -> Request<Body> {
        Request::post("/events")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_event_is_forwarded_to_engine() {
        let (events, mut rx) = mirror_event_channel();
        let router = build_router(AppState::new(events, ReadinessGate::new()));

        let response = router
            .oneshot(post_event(
                r#"{"kind":"update","message":{"id":"1","channel_id":"2","content":"hi"}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        match rx.recv().await.unwrap() {
            MirrorEvent::Updated(message) => {
                assert_eq!(message.id, "1");
                assert_eq!(message.content, "hi");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_event_is_rejected() {
        let (events, _rx) = mirror_event_channel();
        let router = build_router(AppState::new(events, ReadinessGate::new()));

        let response = router
            .oneshot(post_event(r#"{"kind":"explode","message":{}}"#))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_closed_engine_returns_unavailable() {
        let (events, rx) = mirror_event_channel();
        drop(rx);
        let router = build_router(AppState::new(events, ReadinessGate::new()));

        let response = router
            .oneshot(post_event(
                r#"{"kind":"create","message":{"id":"1","channel_id":"2"}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
