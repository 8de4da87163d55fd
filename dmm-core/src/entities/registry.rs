//! Source channel → mirror rule index.

use dmm_sdk::config::{MirrorConfig, TransformSettings};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// A destination webhook and the settings used for every channel feeding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRule {
    /// Destination webhook URL.
    pub webhook: String,
    pub channels: Vec<String>,
    pub settings: TransformSettings,
}

impl From<MirrorConfig> for MirrorRule {
    fn from(config: MirrorConfig) -> Self {
        Self {
            webhook: config.webhook,
            channels: config.channels,
            settings: config.settings,
        }
    }
}

/// Immutable per-channel index of mirror rules.
///
/// One rule covering many channels is stored once and shared by every
/// channel key. When two rules name the same channel the later one wins.
#[derive(Debug, Default)]
pub struct MirrorRegistry {
    rules: HashMap<String, Arc<MirrorRule>>,
}

impl MirrorRegistry {
    pub fn new(mirrors: impl IntoIterator<Item = MirrorConfig>) -> Self {
        let mut rules = HashMap::new();
        let mut mirror_count = 0usize;

        for mirror in mirrors {
            mirror_count += 1;
            let rule = Arc::new(MirrorRule::from(mirror));
            for channel in &rule.channels {
                if rules.insert(channel.clone(), Arc::clone(&rule)).is_some() {
                    warn!(channel = %channel, "Channel is listed by more than one mirror, the later mirror wins");
                }
            }
        }

        info!(
            mirrors = mirror_count,
            channels = rules.len(),
            "Mirror registry loaded"
        );
        Self { rules }
    }

    pub fn lookup(&self, channel_id: &str) -> Option<Arc<MirrorRule>> {
        self.rules.get(channel_id).cloned()
    }

    /// Number of indexed source channels.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
