//! Memoized channel id → name resolution.

use crate::framework::ChannelDirectory;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Channel metadata could not be fetched.
#[derive(Debug, Error)]
#[error("channel {channel_id} lookup failed: {source}")]
pub struct LookupError {
    pub channel_id: String,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl LookupError {
    pub fn new(
        channel_id: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            source: source.into(),
        }
    }
}

/// Resolves channel names through a [`ChannelDirectory`], caching every
/// success for the lifetime of the process.
///
/// Entries are never invalidated, so a renamed channel keeps its old name
/// until restart. Two concurrent misses for the same id both hit the
/// directory; the second write simply overwrites the first.
pub struct ChannelNameResolver {
    directory: Arc<dyn ChannelDirectory>,
    names: RwLock<HashMap<String, String>>,
}

impl ChannelNameResolver {
    pub fn new(directory: Arc<dyn ChannelDirectory>) -> Self {
        Self {
            directory,
            names: RwLock::new(HashMap::new()),
        }
    }

    pub async fn resolve(&self, channel_id: &str) -> Result<String, LookupError> {
        if let Some(name) = self.names.read().await.get(channel_id) {
            return Ok(name.clone());
        }

        let metadata = self.directory.fetch_channel(channel_id).await?;
        let name = if metadata.name.is_empty() {
            channel_id.to_owned()
        } else {
            metadata.name
        };
        debug!(channel_id, name = %name, "Resolved channel name");

        self.names
            .write()
            .await
            .insert(channel_id.to_owned(), name.clone());
        Ok(name)
    }

    pub async fn cached(&self, channel_id: &str) -> Option<String> {
        self.names.read().await.get(channel_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dmm_sdk::objects::ChannelMetadata;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingDirectory {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ChannelDirectory for CountingDirectory {
        async fn fetch_channel(&self, channel_id: &str) -> Result<ChannelMetadata, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LookupError::new(channel_id, "503 Service Unavailable"));
            }
            Ok(ChannelMetadata {
                id: channel_id.to_owned(),
                name: format!("name-{channel_id}"),
                parent_id: None,
            })
        }
    }

    #[tokio::test]
    async fn test_one_lookup_per_channel() {
        let directory = Arc::new(CountingDirectory {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let resolver = ChannelNameResolver::new(directory.clone());

        assert_eq!(resolver.resolve("1").await.unwrap(), "name-1");
        assert_eq!(resolver.resolve("1").await.unwrap(), "name-1");
        assert_eq!(resolver.resolve("2").await.unwrap(), "name-2");
        assert_eq!(directory.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let directory = Arc::new(CountingDirectory {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let resolver = ChannelNameResolver::new(directory.clone());

        let err = resolver.resolve("7").await.unwrap_err();
        assert_eq!(err.channel_id, "7");
        assert!(resolver.cached("7").await.is_none());
        assert!(resolver.resolve("7").await.is_err());
        assert_eq!(directory.calls.load(Ordering::SeqCst), 2);
    }
}
