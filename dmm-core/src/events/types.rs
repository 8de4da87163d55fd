//! Event type definitions.

use dmm_sdk::objects::{EventKind, InboundMessage, IngressEvent};

/// A chat-platform event admitted for mirroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorEvent {
    Created(InboundMessage),
    Updated(InboundMessage),
    Deleted(InboundMessage),
}

impl MirrorEvent {
    /// Build an event from the `(edited, deleted)` flag pair used by the
    /// gateway callbacks. `deleted` takes precedence.
    pub fn from_flags(message: InboundMessage, edited: bool, deleted: bool) -> Self {
        match (edited, deleted) {
            (_, true) => MirrorEvent::Deleted(message),
            (true, false) => MirrorEvent::Updated(message),
            (false, false) => MirrorEvent::Created(message),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            MirrorEvent::Created(_) => EventKind::Create,
            MirrorEvent::Updated(_) => EventKind::Update,
            MirrorEvent::Deleted(_) => EventKind::Delete,
        }
    }

    pub fn message(&self) -> &InboundMessage {
        match self {
            MirrorEvent::Created(message)
            | MirrorEvent::Updated(message)
            | MirrorEvent::Deleted(message) => message,
        }
    }
}

impl From<IngressEvent> for MirrorEvent {
    fn from(event: IngressEvent) -> Self {
        match event.kind {
            EventKind::Create => MirrorEvent::Created(event.message),
            EventKind::Update => MirrorEvent::Updated(event.message),
            EventKind::Delete => MirrorEvent::Deleted(event.message),
        }
    }
}

/// One URL submitted to the resolution queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionTask {
    /// The URL exactly as it appears in the message.
    pub url: String,
    /// Name of the channel the message came from, for auditing.
    pub channel_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_kind() {
        let message = InboundMessage::default();
        assert_eq!(
            MirrorEvent::from_flags(message.clone(), false, false).kind(),
            EventKind::Create
        );
        assert_eq!(
            MirrorEvent::from_flags(message.clone(), true, false).kind(),
            EventKind::Update
        );
        assert_eq!(
            MirrorEvent::from_flags(message.clone(), false, true).kind(),
            EventKind::Delete
        );
        assert_eq!(
            MirrorEvent::from_flags(message, true, true).kind(),
            EventKind::Delete
        );
    }
}
