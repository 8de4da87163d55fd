//! Append-only audit trail.
//!
//! Every observed message, every resolution attempt, every relay and every
//! failure is appended as an [`AuditRecord`]. Where records go is pluggable
//! through [`AuditSink`]; the format is not a compatibility surface.

mod error_sink;
mod file;

pub use error_sink::ErrorSink;
pub use file::JsonLinesAuditSink;

use async_trait::async_trait;
use dmm_sdk::objects::EventKind;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One line of the audit trail. `timestamp` is a unix timestamp in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditRecord {
    /// A message on a mirrored channel was received.
    Observed {
        channel: String,
        message_id: String,
        titles: Vec<String>,
        urls: Vec<String>,
        timestamp: i64,
    },
    /// A resolution task ran. `resolved` is `None` on failure.
    Resolution {
        url: String,
        final_url: String,
        cleaned_url: String,
        resolved: Option<String>,
        channel: String,
        timestamp: i64,
    },
    /// A message was sent, edited or deleted on the destination.
    Relay {
        event: EventKind,
        channel: String,
        source_message_id: String,
        dest_message_id: String,
        timestamp: i64,
    },
    /// An operation failed.
    Error {
        operation: String,
        message: String,
        timestamp: i64,
    },
}

pub fn now_timestamp() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// Destination for audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Emits each record as a structured `tracing` event.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let json = serde_json::to_string(record)?;
        info!(target: "dmm::audit", record = %json, "audit");
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}
