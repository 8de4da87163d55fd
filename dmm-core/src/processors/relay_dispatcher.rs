//! RelayDispatcher.
//!
//! Sends, edits and deletes the destination copy of a mirrored message and
//! keeps the [`CorrelationTable`] in step:
//! - create: send, then remember `source id → destination id`
//! - edit/delete: look the destination id up; without a record nothing is sent
//!
//! Failures are returned to the caller and never retried.

use crate::audit::{AuditRecord, AuditSink, now_timestamp};
use crate::entities::CorrelationTable;
use crate::framework::DestinationSink;
use dmm_sdk::objects::{EventKind, WebhookPayload};
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The destination rejected or could not be reached for an operation.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("destination {operation} failed: {source}")]
    Sink {
        operation: EventKind,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl RelayError {
    pub fn sink(
        operation: EventKind,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Sink {
            operation,
            source: source.into(),
        }
    }
}

/// What to do on the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayAction {
    Send(WebhookPayload),
    Edit(WebhookPayload),
    Delete,
}

impl RelayAction {
    pub fn kind(&self) -> EventKind {
        match self {
            RelayAction::Send(_) => EventKind::Create,
            RelayAction::Edit(_) => EventKind::Update,
            RelayAction::Delete => EventKind::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent { dest_message_id: String },
    Edited { dest_message_id: String },
    Deleted { dest_message_id: String },
    /// Edit or delete for a message that was never relayed (or whose record
    /// expired). Nothing was sent.
    Uncorrelated,
}

pub struct RelayDispatcher {
    sink: Arc<dyn DestinationSink>,
    correlations: Arc<CorrelationTable>,
    audit: Arc<dyn AuditSink>,
}

impl RelayDispatcher {
    pub fn new(
        sink: Arc<dyn DestinationSink>,
        correlations: Arc<CorrelationTable>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            sink,
            correlations,
            audit,
        }
    }

    pub fn correlations(&self) -> &Arc<CorrelationTable> {
        &self.correlations
    }

    pub async fn relay(
        &self,
        webhook: &str,
        source_message_id: &str,
        channel_name: &str,
        action: RelayAction,
    ) -> Result<DispatchOutcome, RelayError> {
        let kind = action.kind();

        let outcome = match action {
            RelayAction::Send(payload) => {
                let dest_message_id = self.sink.send(webhook, &payload).await?;
                self.correlations
                    .insert(source_message_id, &dest_message_id)
                    .await;
                DispatchOutcome::Sent { dest_message_id }
            }
            RelayAction::Edit(payload) => {
                let Some(dest_message_id) = self.correlations.find(source_message_id).await else {
                    debug!(source_message_id, "No correlation for edited message, dropping");
                    return Ok(DispatchOutcome::Uncorrelated);
                };
                self.sink.edit(webhook, &dest_message_id, &payload).await?;
                DispatchOutcome::Edited { dest_message_id }
            }
            RelayAction::Delete => {
                let Some(dest_message_id) = self.correlations.find(source_message_id).await else {
                    debug!(source_message_id, "No correlation for deleted message, dropping");
                    return Ok(DispatchOutcome::Uncorrelated);
                };
                self.sink.delete(webhook, &dest_message_id).await?;
                DispatchOutcome::Deleted { dest_message_id }
            }
        };

        if let DispatchOutcome::Sent { dest_message_id }
        | DispatchOutcome::Edited { dest_message_id }
        | DispatchOutcome::Deleted { dest_message_id } = &outcome
        {
            info!(
                event = %kind,
                channel = %channel_name,
                source_message_id,
                dest_message_id = %dest_message_id,
                "Relayed message"
            );
            let record = AuditRecord::Relay {
                event: kind,
                channel: channel_name.to_owned(),
                source_message_id: source_message_id.to_owned(),
                dest_message_id: dest_message_id.clone(),
                timestamp: now_timestamp(),
            };
            if let Err(e) = self.audit.append(&record).await {
                warn!(error = %e, "Failed to append relay record");
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// A recorded destination call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum SinkCall {
        Send {
            webhook: String,
            payload: WebhookPayload,
        },
        Edit {
            webhook: String,
            message_id: String,
            payload: WebhookPayload,
        },
        Delete {
            webhook: String,
            message_id: String,
        },
    }

    /// Destination that records calls and hands out sequential ids.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub(crate) calls: Mutex<Vec<SinkCall>>,
        pub(crate) fail: bool,
    }

    impl RecordingSink {
        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub(crate) fn calls(&self) -> Vec<SinkCall> {
            self.calls.lock().unwrap().clone()
        }

        fn check(&self, operation: EventKind) -> Result<(), RelayError> {
            if self.fail {
                return Err(RelayError::sink(operation, "status 404: Unknown Webhook"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DestinationSink for RecordingSink {
        async fn send(&self, webhook: &str, payload: &WebhookPayload) -> Result<String, RelayError> {
            self.check(EventKind::Create)?;
            let mut calls = self.calls.lock().unwrap();
            calls.push(SinkCall::Send {
                webhook: webhook.to_owned(),
                payload: payload.clone(),
            });
            Ok(format!("D{}", calls.len()))
        }

        async fn edit(
            &self,
            webhook: &str,
            message_id: &str,
            payload: &WebhookPayload,
        ) -> Result<(), RelayError> {
            self.check(EventKind::Update)?;
            self.calls.lock().unwrap().push(SinkCall::Edit {
                webhook: webhook.to_owned(),
                message_id: message_id.to_owned(),
                payload: payload.clone(),
            });
            Ok(())
        }

        async fn delete(&self, webhook: &str, message_id: &str) -> Result<(), RelayError> {
            self.check(EventKind::Delete)?;
            self.calls.lock().unwrap().push(SinkCall::Delete {
                webhook: webhook.to_owned(),
                message_id: message_id.to_owned(),
            });
            Ok(())
        }
    }

    const WEBHOOK: &str = "https://discord.example/api/webhooks/1/t";

    fn dispatcher(sink: Arc<RecordingSink>) -> (RelayDispatcher, Arc<MemoryAuditSink>) {
        let audit = Arc::new(MemoryAuditSink::new());
        let dispatcher =
            RelayDispatcher::new(sink, Arc::new(CorrelationTable::new()), audit.clone());
        (dispatcher, audit)
    }

    fn payload(content: &str) -> WebhookPayload {
        WebhookPayload {
            content: Some(content.to_owned()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_then_edit_targets_destination_id() {
        let sink = Arc::new(RecordingSink::default());
        let (dispatcher, audit) = dispatcher(sink.clone());

        let sent = dispatcher
            .relay(WEBHOOK, "S1", "deals", RelayAction::Send(payload("v1")))
            .await
            .unwrap();
        assert_eq!(
            sent,
            DispatchOutcome::Sent {
                dest_message_id: "D1".into()
            }
        );

        let edited = dispatcher
            .relay(WEBHOOK, "S1", "deals", RelayAction::Edit(payload("v2")))
            .await
            .unwrap();
        assert_eq!(
            edited,
            DispatchOutcome::Edited {
                dest_message_id: "D1".into()
            }
        );

        let calls = sink.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[1], SinkCall::Edit { message_id, .. } if message_id == "D1"));
        assert_eq!(audit.records().await.len(), 2);
    }

    #[tokio::test]
    async fn test_uncorrelated_edit_and_delete_make_no_call() {
        let sink = Arc::new(RecordingSink::default());
        let (dispatcher, audit) = dispatcher(sink.clone());

        let edited = dispatcher
            .relay(WEBHOOK, "unknown", "deals", RelayAction::Edit(payload("x")))
            .await
            .unwrap();
        let deleted = dispatcher
            .relay(WEBHOOK, "unknown", "deals", RelayAction::Delete)
            .await
            .unwrap();

        assert_eq!(edited, DispatchOutcome::Uncorrelated);
        assert_eq!(deleted, DispatchOutcome::Uncorrelated);
        assert!(sink.calls().is_empty());
        assert!(audit.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_keeps_correlation() {
        let sink = Arc::new(RecordingSink::default());
        let (dispatcher, _audit) = dispatcher(sink.clone());

        dispatcher
            .relay(WEBHOOK, "S1", "deals", RelayAction::Send(payload("v1")))
            .await
            .unwrap();
        dispatcher
            .relay(WEBHOOK, "S1", "deals", RelayAction::Delete)
            .await
            .unwrap();

        assert!(matches!(
            &sink.calls()[1],
            SinkCall::Delete { message_id, .. } if message_id == "D1"
        ));
        assert_eq!(dispatcher.correlations().find("S1").await.as_deref(), Some("D1"));
    }

    #[tokio::test]
    async fn test_failed_send_records_nothing() {
        let sink = Arc::new(RecordingSink::failing());
        let (dispatcher, audit) = dispatcher(sink);

        let result = dispatcher
            .relay(WEBHOOK, "S1", "deals", RelayAction::Send(payload("v1")))
            .await;

        assert!(matches!(
            result,
            Err(RelayError::Sink {
                operation: EventKind::Create,
                ..
            })
        ));
        assert!(dispatcher.correlations().is_empty().await);
        assert!(audit.records().await.is_empty());
    }
}
