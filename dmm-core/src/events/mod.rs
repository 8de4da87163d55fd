//! Event system for the mirroring pipeline.
//!
//! # Event Flow
//!
//! 1. The ingress converts gateway callbacks into `MirrorEvent`s
//! 2. The `MirrorEngine` runner spawns one handler per event
//! 3. Handlers submit `ResolutionTask`s to the `ResolutionQueue` and await
//!    the outcome before relaying
//!
//! Events carry the full message; nothing is re-fetched.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, MirrorEventReceiver, MirrorEventSender, mirror_event_channel,
};

pub use types::{MirrorEvent, ResolutionTask};
