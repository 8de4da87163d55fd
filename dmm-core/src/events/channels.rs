//! Event channel factories and handles.

use super::types::MirrorEvent;
use tokio::sync::mpsc;

/// Default buffer size for event channels.
///
/// This provides enough buffer to handle bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for MirrorEvent events.
pub type MirrorEventSender = mpsc::Sender<MirrorEvent>;
/// Receiver handle for MirrorEvent events.
pub type MirrorEventReceiver = mpsc::Receiver<MirrorEvent>;

/// Create a new MirrorEvent channel.
///
/// The ingress holds the sender; the mirror engine runner drains the
/// receiver. Multiple senders can be cloned from the returned sender.
pub fn mirror_event_channel() -> (MirrorEventSender, MirrorEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
