//! Raw URL → resolved link cache with counter-based flushing.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

/// Outcome of one resolution task, as cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedLink {
    /// The capability returned an affiliate link.
    Resolved(String),
    /// Resolution failed; the original URL is kept until the next flush.
    Passthrough,
}

impl CachedLink {
    pub fn resolved(&self) -> Option<&str> {
        match self {
            CachedLink::Resolved(link) => Some(link),
            CachedLink::Passthrough => None,
        }
    }
}

struct CacheState {
    entries: HashMap<String, CachedLink>,
    processed: usize,
}

/// Link resolution cache shared by every event handler.
///
/// Every task that ran to completion bumps a counter, whether it produced a
/// link or a passthrough entry; once the counter exceeds the flush
/// threshold the whole cache is dropped and the counter starts over. Entries
/// and counter share one lock so a flush never races an insert.
pub struct LinkResolutionCache {
    state: RwLock<CacheState>,
    flush_threshold: usize,
}

impl LinkResolutionCache {
    pub fn new(flush_threshold: usize) -> Self {
        Self {
            state: RwLock::new(CacheState {
                entries: HashMap::new(),
                processed: 0,
            }),
            flush_threshold,
        }
    }

    pub async fn get(&self, raw_url: &str) -> Option<CachedLink> {
        self.state.read().await.entries.get(raw_url).cloned()
    }

    /// Store the outcome of a processed task and apply the flush policy.
    ///
    /// Returns `true` when this call flushed the cache.
    pub async fn record(&self, raw_url: String, link: CachedLink) -> bool {
        let mut state = self.state.write().await;
        state.entries.insert(raw_url, link);
        state.processed += 1;

        if state.processed > self.flush_threshold {
            let evicted = state.entries.len();
            state.entries.clear();
            state.processed = 0;
            info!(evicted, "Link cache flushed");
            return true;
        }
        false
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Tasks processed since the last flush.
    pub async fn processed(&self) -> usize {
        self.state.read().await.processed
    }
}
