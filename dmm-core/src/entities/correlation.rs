//! Source message → destination message correlation.

use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use tracing::debug;

/// How long a relayed message can still be edited or deleted.
pub const CORRELATION_TTL: Duration = Duration::hours(24);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationRecord {
    pub source_message_id: String,
    pub dest_message_id: String,
    pub expires_at: OffsetDateTime,
}

impl CorrelationRecord {
    pub fn is_live(&self, now: OffsetDateTime) -> bool {
        self.expires_at > now
    }
}

/// In-memory list of relayed messages.
///
/// Lookups take the first live record for a source id; duplicates are not
/// prevented. Expired records never match and are pruned whenever a new
/// record is inserted.
pub struct CorrelationTable {
    records: RwLock<Vec<CorrelationRecord>>,
    ttl: Duration,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::with_ttl(CORRELATION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            ttl,
        }
    }

    pub async fn insert(&self, source_message_id: &str, dest_message_id: &str) {
        self.insert_at(source_message_id, dest_message_id, OffsetDateTime::now_utc())
            .await;
    }

    pub async fn insert_at(
        &self,
        source_message_id: &str,
        dest_message_id: &str,
        now: OffsetDateTime,
    ) {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record.is_live(now));
        if records.len() != before {
            debug!(pruned = before - records.len(), "Pruned expired correlations");
        }

        records.push(CorrelationRecord {
            source_message_id: source_message_id.to_owned(),
            dest_message_id: dest_message_id.to_owned(),
            expires_at: now + self.ttl,
        });
    }

    /// Destination id of the first live record for `source_message_id`.
    pub async fn find(&self, source_message_id: &str) -> Option<String> {
        self.find_at(source_message_id, OffsetDateTime::now_utc())
            .await
    }

    pub async fn find_at(&self, source_message_id: &str, now: OffsetDateTime) -> Option<String> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| record.source_message_id == source_message_id && record.is_live(now))
            .map(|record| record.dest_message_id.clone())
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_after_insert() {
        let table = CorrelationTable::new();
        table.insert("src-1", "dst-1").await;

        assert_eq!(table.find("src-1").await.as_deref(), Some("dst-1"));
        assert!(table.find("src-2").await.is_none());
    }

    #[tokio::test]
    async fn test_first_match_wins_on_duplicates() {
        let table = CorrelationTable::new();
        table.insert("src-1", "dst-1").await;
        table.insert("src-1", "dst-2").await;

        assert_eq!(table.len().await, 2);
        assert_eq!(table.find("src-1").await.as_deref(), Some("dst-1"));
    }

    #[tokio::test]
    async fn test_expired_records_do_not_match() {
        let table = CorrelationTable::new();
        let created = OffsetDateTime::now_utc();
        table.insert_at("src-1", "dst-1", created).await;

        let later = created + Duration::hours(25);
        assert!(table.find_at("src-1", later).await.is_none());
        assert_eq!(
            table.find_at("src-1", created + Duration::hours(23)).await.as_deref(),
            Some("dst-1")
        );
    }

    #[tokio::test]
    async fn test_insert_prunes_expired_records() {
        let table = CorrelationTable::new();
        let created = OffsetDateTime::now_utc();
        table.insert_at("old", "dst-old", created).await;
        table
            .insert_at("new", "dst-new", created + Duration::hours(30))
            .await;

        assert_eq!(table.len().await, 1);
        assert!(table.find_at("old", created).await.is_none());
    }
}
