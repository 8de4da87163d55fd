//! Events posted to the relay's ingress by a gateway bridge.

use serde::{Deserialize, Serialize};

use super::message::InboundMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Create => write!(f, "create"),
            EventKind::Update => write!(f, "update"),
            EventKind::Delete => write!(f, "delete"),
        }
    }
}

/// A chat-platform event as received over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressEvent {
    pub kind: EventKind,
    pub message: InboundMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingress_event_parsing() {
        let event: IngressEvent = serde_json::from_str(
            r#"{"kind":"update","message":{"id":"1","channel_id":"2","content":"hi"}}"#,
        )
        .unwrap();
        assert_eq!(event.kind, EventKind::Update);
        assert_eq!(event.message.content, "hi");
    }
}
