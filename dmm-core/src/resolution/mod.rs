//! Link resolution support: readiness gate, redirect following, errors.
//!
//! The queue that serializes calls into the capability lives in
//! [`crate::processors::resolution_queue`].

pub mod readiness;
pub mod redirect;

pub use readiness::ReadinessGate;
pub use redirect::{
    NoRedirects, RedirectError, RedirectFollower, RedirectResolver, clean_url,
};

use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Errors from the link-resolution capability or the queue in front of it.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The capability cannot serve requests right now.
    #[error("resolution service unavailable: {0}")]
    Unavailable(String),

    /// The capability call failed.
    #[error("resolution failed: {context}: {source}")]
    Failed {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The capability did not answer in time.
    #[error("resolution timed out after {0:?}")]
    Timeout(Duration),

    /// The queue worker has shut down.
    #[error("resolution queue closed")]
    QueueClosed,
}

impl ResolutionError {
    pub fn failed(
        context: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Failed {
            context: context.into(),
            source: source.into(),
        }
    }
}
