//! Runtime configuration consumed by the relay core.
//!
//! These types are the validated, in-memory form of the config file. Loading
//! and validation are handled by the server crate.

use dmm_sdk::config::MirrorConfig;
use std::time::Duration;

/// Domain fragments whose links are rewritten when no allowlist is configured.
pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &["mavely"];

/// Processed resolution tasks after which the link cache is flushed.
pub const DEFAULT_CACHE_FLUSH_THRESHOLD: usize = 10;

/// Everything the mirror engine needs at construction.
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    pub mirrors: Vec<MirrorConfig>,
    pub resolution: ResolutionConfig,
}

/// Link resolution settings.
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    /// A URL is rewritten when it contains one of these strings.
    pub allowed_domains: Vec<String>,
    /// The cache is cleared once more than this many tasks were processed.
    pub cache_flush_threshold: usize,
    /// Upper bound for one call into the resolution service.
    pub resolve_timeout: Duration,
    pub redirect: RedirectConfig,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            allowed_domains: DEFAULT_ALLOWED_DOMAINS
                .iter()
                .map(|d| (*d).to_owned())
                .collect(),
            cache_flush_threshold: DEFAULT_CACHE_FLUSH_THRESHOLD,
            resolve_timeout: Duration::from_secs(60),
            redirect: RedirectConfig::default(),
        }
    }
}

/// Redirect following applied to a URL before it is submitted for resolution.
#[derive(Debug, Clone)]
pub struct RedirectConfig {
    /// When disabled the submitted URL is only stripped of its query.
    pub enabled: bool,
    pub max_redirects: usize,
    pub timeout: Duration,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_redirects: 10,
            timeout: Duration::from_secs(15),
        }
    }
}
