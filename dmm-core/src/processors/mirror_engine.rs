//! MirrorEngine processor.
//!
//! The MirrorEngine is responsible for:
//! - Receiving `MirrorEvent`s, either directly through [`MirrorEngine::on_mirror`]
//!   or from the ingress channel via [`MirrorEngine::run`]
//! - Resolving the source channel name and the matching mirror rule
//! - Transforming the message and resolving its allowlisted links
//! - Handing the result to the `RelayDispatcher`
//!
//! Each event is handled independently; a failure in one stage is recorded
//! in the `ErrorSink` and never affects other events.

use crate::audit::{AuditRecord, AuditSink, ErrorSink, now_timestamp};
use crate::config::RelayConfig;
use crate::entities::{
    CachedLink, ChannelNameResolver, CorrelationTable, LinkResolutionCache, MirrorRegistry,
};
use crate::events::{MirrorEvent, MirrorEventReceiver, ResolutionTask};
use crate::framework::{ChannelDirectory, DestinationSink, LinkResolver};
use crate::processors::relay_dispatcher::{DispatchOutcome, RelayAction, RelayDispatcher};
use crate::processors::resolution_queue::{ResolutionQueue, ResolutionQueueHandle};
use crate::resolution::{ReadinessGate, RedirectFollower};
use crate::utils::{LinkExtractor, build_payload, rewrite_links, text_transformer};
use dmm_sdk::objects::{InboundMessage, WebhookPayload};
use kanau::processor::Processor;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// External collaborators plugged into the engine.
#[derive(Clone)]
pub struct Collaborators {
    pub channels: Arc<dyn ChannelDirectory>,
    pub sink: Arc<dyn DestinationSink>,
    pub resolver: Arc<dyn LinkResolver>,
    pub redirects: Arc<dyn RedirectFollower>,
    pub audit: Arc<dyn AuditSink>,
}

/// Owns every piece of mirroring state. Construct one per process.
pub struct MirrorEngine {
    registry: MirrorRegistry,
    channel_names: ChannelNameResolver,
    extractor: LinkExtractor,
    cache: Arc<LinkResolutionCache>,
    queue: ResolutionQueueHandle,
    dispatcher: RelayDispatcher,
    audit: Arc<dyn AuditSink>,
    errors: ErrorSink,
}

impl MirrorEngine {
    /// Build the engine and the resolution worker it submits to.
    ///
    /// The returned [`ResolutionQueue`] must be run (usually spawned) for
    /// link resolution to make progress.
    pub fn new(
        config: RelayConfig,
        collaborators: Collaborators,
        readiness: ReadinessGate,
    ) -> (Self, ResolutionQueue) {
        let Collaborators {
            channels,
            sink,
            resolver,
            redirects,
            audit,
        } = collaborators;
        let resolution = config.resolution;

        let cache = Arc::new(LinkResolutionCache::new(resolution.cache_flush_threshold));
        let (queue, handle) = ResolutionQueue::new(
            resolver,
            redirects,
            cache.clone(),
            readiness,
            audit.clone(),
            resolution.resolve_timeout,
        );

        let engine = Self {
            registry: MirrorRegistry::new(config.mirrors),
            channel_names: ChannelNameResolver::new(channels),
            extractor: LinkExtractor::new(resolution.allowed_domains),
            cache,
            queue: handle,
            dispatcher: RelayDispatcher::new(
                sink,
                Arc::new(CorrelationTable::new()),
                audit.clone(),
            ),
            errors: ErrorSink::new(audit.clone()),
            audit,
        };
        (engine, queue)
    }

    /// Gateway-style entry point. `deleted` wins over `edited`.
    pub async fn on_mirror(&self, message: InboundMessage, edited: bool, deleted: bool) {
        self.handle(MirrorEvent::from_flags(message, edited, deleted))
            .await;
    }

    /// Process one event end to end.
    ///
    /// Returns `None` when the event was ignored (no rule) or a stage failed;
    /// failures are already recorded.
    pub async fn handle(&self, event: MirrorEvent) -> Option<DispatchOutcome> {
        let kind = event.kind();
        let message = event.message();
        let channel_id = message.routing_channel_id();

        // Records carry the source channel's own name, the thread for forum posts.
        let channel_name = match self.channel_names.resolve(&message.channel_id).await {
            Ok(name) => name,
            Err(e) => {
                self.errors.record("channel_lookup", &e).await;
                message.channel_id.clone()
            }
        };

        let Some(rule) = self.registry.lookup(channel_id) else {
            debug!(channel_id, "No mirror rule for channel, ignoring");
            return None;
        };

        debug!(
            event = %kind,
            channel = %channel_name,
            message_id = %message.id,
            "Mirroring message"
        );

        let action = match event {
            MirrorEvent::Deleted(_) => RelayAction::Delete,
            MirrorEvent::Created(ref message) | MirrorEvent::Updated(ref message) => {
                self.observe(&channel_name, message).await;

                let transformed = text_transformer::apply(message, &rule.settings);
                let mut payload =
                    build_payload(transformed, &rule.settings, message.thread.as_ref());
                let resolved = self.resolve_links(&payload, &channel_name).await;
                rewrite_links(&mut payload, &resolved);

                if matches!(event, MirrorEvent::Created(_)) {
                    RelayAction::Send(payload)
                } else {
                    RelayAction::Edit(payload)
                }
            }
        };

        match self
            .dispatcher
            .relay(&rule.webhook, &message.id, &channel_name, action)
            .await
        {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.errors.record(&format!("relay_{kind}"), &e).await;
                None
            }
        }
    }

    /// Resolve every allowlisted link of `payload`, returning raw → resolved
    /// for the links that have a resolution.
    async fn resolve_links(
        &self,
        payload: &WebhookPayload,
        channel_name: &str,
    ) -> HashMap<String, String> {
        let mut resolved = HashMap::new();
        let mut pending = Vec::new();

        for url in self.extractor.extract(payload) {
            match self.cache.get(&url).await {
                Some(CachedLink::Resolved(link)) => {
                    resolved.insert(url, link);
                }
                Some(CachedLink::Passthrough) => {}
                None => pending.push(url),
            }
        }

        if pending.is_empty() {
            return resolved;
        }
        debug!(count = pending.len(), channel = %channel_name, "Submitting links for resolution");

        let submissions = pending.into_iter().map(|url| {
            let task = ResolutionTask {
                url: url.clone(),
                channel_name: channel_name.to_owned(),
            };
            async move { (url, self.queue.submit(task).await) }
        });

        for (url, outcome) in futures_util::future::join_all(submissions).await {
            match outcome {
                Ok(CachedLink::Resolved(link)) => {
                    resolved.insert(url, link);
                }
                Ok(CachedLink::Passthrough) => {}
                Err(e) => self.errors.record("submit_resolution", &e).await,
            }
        }
        resolved
    }

    /// Append an `observed` record for a message on a mirrored channel.
    async fn observe(&self, channel_name: &str, message: &InboundMessage) {
        let record = AuditRecord::Observed {
            channel: channel_name.to_owned(),
            message_id: message.id.clone(),
            titles: message
                .embeds
                .iter()
                .filter_map(|e| e.title.clone())
                .collect(),
            urls: message.embeds.iter().filter_map(|e| e.url.clone()).collect(),
            timestamp: now_timestamp(),
        };
        if let Err(e) = self.audit.append(&record).await {
            warn!(error = %e, "Failed to append observed record");
        }
    }

    /// Run the engine until shutdown is signaled or the event channel closes.
    ///
    /// Every event is handled on its own task. Handlers still running at
    /// shutdown are awaited before returning.
    pub async fn run(
        self: Arc<Self>,
        mut shutdown_rx: watch::Receiver<bool>,
        mut event_rx: MirrorEventReceiver,
    ) {
        info!(channels = self.registry.len(), "MirrorEngine started");
        let mut handlers = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("MirrorEngine received shutdown signal");
                        break;
                    }
                }

                event = event_rx.recv() => {
                    let Some(event) = event else {
                        info!("MirrorEvent channel closed");
                        break;
                    };
                    let engine = Arc::clone(&self);
                    handlers.spawn(async move {
                        let _ = engine.process(event).await;
                    });
                }

                Some(joined) = handlers.join_next(), if !handlers.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "Mirror handler task failed");
                    }
                }
            }
        }

        while let Some(joined) = handlers.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Mirror handler task failed");
            }
        }
        info!("MirrorEngine shutdown complete");
    }
}

impl Processor<MirrorEvent> for MirrorEngine {
    type Output = ();
    type Error = Infallible;

    async fn process(&self, event: MirrorEvent) -> Result<(), Infallible> {
        self.handle(event).await;
        Ok(())
    }
}
