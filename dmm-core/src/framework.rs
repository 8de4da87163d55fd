//! Collaborator seams of the relay core.
//!
//! The engine never talks HTTP to the chat platform, the destination
//! webhooks or the resolution service directly. The server crate plugs
//! concrete clients in through these traits; tests plug in fakes.

use crate::entities::channel_names::LookupError;
use crate::processors::relay_dispatcher::RelayError;
use crate::resolution::ResolutionError;
use async_trait::async_trait;
use dmm_sdk::objects::{ChannelMetadata, WebhookPayload};

/// Source of channel metadata (`GET /channels/{id}`).
#[async_trait]
pub trait ChannelDirectory: Send + Sync {
    async fn fetch_channel(&self, channel_id: &str) -> Result<ChannelMetadata, LookupError>;
}

/// Webhook-style destination for mirrored messages.
///
/// `webhook` is the sink handle from the matching mirror rule.
#[async_trait]
pub trait DestinationSink: Send + Sync {
    /// Send a new message and return its destination id.
    async fn send(&self, webhook: &str, payload: &WebhookPayload) -> Result<String, RelayError>;

    async fn edit(
        &self,
        webhook: &str,
        message_id: &str,
        payload: &WebhookPayload,
    ) -> Result<(), RelayError>;

    async fn delete(&self, webhook: &str, message_id: &str) -> Result<(), RelayError>;
}

/// The external link-resolution capability.
///
/// Implementations wrap a single stateful session and must only ever see one
/// call at a time; the resolution queue guarantees that.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    /// `Ok(None)` means the capability ran but produced no link.
    async fn resolve(&self, url: &str) -> Result<Option<String>, ResolutionError>;
}
