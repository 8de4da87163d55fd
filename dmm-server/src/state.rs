//! Application state shared across all request handlers.

use dmm_core::events::MirrorEventSender;
use dmm_core::resolution::ReadinessGate;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around.
#[derive(Clone)]
pub struct AppState {
    /// Feeds accepted events to the mirror engine runner.
    pub events: MirrorEventSender,
    /// Readiness of the link-resolution session, reported by `/ready`.
    pub readiness: ReadinessGate,
}

impl AppState {
    pub fn new(events: MirrorEventSender, readiness: ReadinessGate) -> Self {
        Self { events, readiness }
    }
}
