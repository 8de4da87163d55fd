use super::{AuditRecord, AuditSink, now_timestamp};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{error, warn};

/// The single error-recording boundary of the pipeline.
///
/// Every failure that stops one stage of one event ends up here: a console
/// line plus an `error` audit record. Recording never fails; a broken audit
/// sink is only logged.
#[derive(Clone)]
pub struct ErrorSink {
    audit: Arc<dyn AuditSink>,
}

impl ErrorSink {
    pub fn new(audit: Arc<dyn AuditSink>) -> Self {
        Self { audit }
    }

    pub async fn record(&self, operation: &str, err: impl Display) {
        let message = err.to_string();
        error!(operation, error = %message, "Operation failed");

        let record = AuditRecord::Error {
            operation: operation.to_owned(),
            message,
            timestamp: now_timestamp(),
        };
        if let Err(e) = self.audit.append(&record).await {
            warn!(operation, error = %e, "Failed to append error record");
        }
    }
}
