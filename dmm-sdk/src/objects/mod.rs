pub mod channel;
pub mod event;
pub mod message;
pub mod resolver;
pub mod webhook;

pub use channel::ChannelMetadata;
pub use event::{EventKind, IngressEvent};
pub use message::{
    Attachment, Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedMedia, InboundMessage,
    ThreadContext,
};
pub use resolver::{ReadinessResponse, ResolveLinkRequest, ResolveLinkResponse};
pub use webhook::{WebhookMessage, WebhookPayload};
