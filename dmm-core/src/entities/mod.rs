//! In-memory state owned by the mirror engine.
//!
//! Nothing here survives a restart: the registry is rebuilt from config, and
//! the caches and correlation table start empty.

pub mod channel_names;
pub mod correlation;
pub mod link_cache;
pub mod registry;

pub use channel_names::{ChannelNameResolver, LookupError};
pub use correlation::{CORRELATION_TTL, CorrelationRecord, CorrelationTable};
pub use link_cache::{CachedLink, LinkResolutionCache};
pub use registry::{MirrorRegistry, MirrorRule};
