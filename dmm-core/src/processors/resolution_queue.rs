//! ResolutionQueue processor.
//!
//! The ResolutionQueue is responsible for:
//! - Receiving `ResolutionTask`s from event handlers through a
//!   [`ResolutionQueueHandle`]
//! - Holding every task until the resolution session signals readiness
//! - Following redirects and cleaning the URL before submission
//! - Calling the link-resolution capability, one call at a time
//! - Recording the outcome in the `LinkResolutionCache` and the audit trail
//!
//! A single worker drains the channel, so tasks run strictly in FIFO order and
//! capability calls never overlap. The outcome is also sent back to the
//! submitter, so a cache flush triggered by the very same task never loses it.

use crate::audit::{AuditRecord, AuditSink, ErrorSink, now_timestamp};
use crate::entities::{CachedLink, LinkResolutionCache};
use crate::events::{DEFAULT_CHANNEL_BUFFER, ResolutionTask};
use crate::framework::LinkResolver;
use crate::resolution::{ReadinessGate, RedirectFollower, ResolutionError, clean_url};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

/// A queued task and the channel its outcome is delivered on.
pub struct ResolutionJob {
    pub task: ResolutionTask,
    reply: oneshot::Sender<CachedLink>,
}

/// Submission side of the queue. Cheap to clone.
#[derive(Clone)]
pub struct ResolutionQueueHandle {
    tx: mpsc::Sender<ResolutionJob>,
}

impl ResolutionQueueHandle {
    /// Enqueue `task` and wait for its outcome.
    ///
    /// Fails only when the worker is gone (shutdown) before answering.
    pub async fn submit(&self, task: ResolutionTask) -> Result<CachedLink, ResolutionError> {
        let (reply, outcome) = oneshot::channel();
        self.tx
            .send(ResolutionJob { task, reply })
            .await
            .map_err(|_| ResolutionError::QueueClosed)?;
        outcome.await.map_err(|_| ResolutionError::QueueClosed)
    }
}

/// Single-concurrency worker in front of the link-resolution capability.
pub struct ResolutionQueue {
    rx: mpsc::Receiver<ResolutionJob>,
    resolver: Arc<dyn LinkResolver>,
    redirects: Arc<dyn RedirectFollower>,
    cache: Arc<LinkResolutionCache>,
    readiness: ReadinessGate,
    audit: Arc<dyn AuditSink>,
    errors: ErrorSink,
    resolve_timeout: Duration,
}

impl ResolutionQueue {
    /// Create the worker and its submission handle.
    pub fn new(
        resolver: Arc<dyn LinkResolver>,
        redirects: Arc<dyn RedirectFollower>,
        cache: Arc<LinkResolutionCache>,
        readiness: ReadinessGate,
        audit: Arc<dyn AuditSink>,
        resolve_timeout: Duration,
    ) -> (Self, ResolutionQueueHandle) {
        let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_BUFFER);
        let errors = ErrorSink::new(audit.clone());
        let queue = Self {
            rx,
            resolver,
            redirects,
            cache,
            readiness,
            audit,
            errors,
            resolve_timeout,
        };
        (queue, ResolutionQueueHandle { tx })
    }

    /// Run the worker until shutdown is signaled or every handle is dropped.
    ///
    /// Jobs still queued at shutdown are dropped; their submitters observe
    /// [`ResolutionError::QueueClosed`].
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!("ResolutionQueue started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("ResolutionQueue received shutdown signal");
                        break;
                    }
                }

                job = self.rx.recv() => {
                    let Some(job) = job else {
                        info!("ResolutionTask channel closed");
                        break;
                    };
                    if !self.wait_ready(&mut shutdown_rx).await {
                        info!("ResolutionQueue shut down while waiting for readiness");
                        break;
                    }
                    let outcome = self.execute(&job.task).await;
                    // The submitter may have gone away; the cache still has it.
                    let _ = job.reply.send(outcome);
                }
            }
        }

        info!("ResolutionQueue shutdown complete");
    }

    /// Returns `false` when shutdown fired before the gate opened.
    async fn wait_ready(&self, shutdown_rx: &mut watch::Receiver<bool>) -> bool {
        if self.readiness.is_ready() {
            return true;
        }
        debug!("Holding resolution task until the session is ready");
        tokio::select! {
            biased;
            _ = shutdown_rx.wait_for(|stop| *stop) => false,
            _ = self.readiness.wait() => true,
        }
    }

    /// Run one task to completion. Never fails: every error degrades to a
    /// passthrough entry.
    async fn execute(&self, task: &ResolutionTask) -> CachedLink {
        let final_url = match self.redirects.follow(&task.url).await {
            Ok(final_url) => final_url,
            Err(e) => {
                self.errors.record("follow_redirects", &e).await;
                task.url.clone()
            }
        };
        let cleaned_url = clean_url(&final_url);

        let outcome =
            match tokio::time::timeout(self.resolve_timeout, self.resolver.resolve(&cleaned_url))
                .await
            {
                Ok(Ok(Some(link))) => CachedLink::Resolved(link),
                Ok(Ok(None)) => {
                    warn!(url = %task.url, cleaned_url = %cleaned_url, "Resolution produced no link");
                    CachedLink::Passthrough
                }
                Ok(Err(e)) => {
                    self.errors.record("resolve_link", &e).await;
                    CachedLink::Passthrough
                }
                Err(_) => {
                    let e = ResolutionError::Timeout(self.resolve_timeout);
                    self.errors.record("resolve_link", &e).await;
                    CachedLink::Passthrough
                }
            };

        info!(
            url = %task.url,
            channel = %task.channel_name,
            resolved = ?outcome.resolved(),
            "Resolution task processed"
        );

        let record = AuditRecord::Resolution {
            url: task.url.clone(),
            final_url,
            cleaned_url,
            resolved: outcome.resolved().map(str::to_owned),
            channel: task.channel_name.clone(),
            timestamp: now_timestamp(),
        };
        if let Err(e) = self.audit.append(&record).await {
            warn!(error = %e, "Failed to append resolution record");
        }

        self.cache.record(task.url.clone(), outcome.clone()).await;
        outcome
    }
}
