//! Processors of the mirroring pipeline.
//!
//! - `MirrorEngine`: receives `MirrorEvent`, transforms, resolves links, relays
//! - `ResolutionQueue`: receives `ResolutionTask`, calls the resolution capability
//! - `RelayDispatcher`: sends/edits/deletes on the destination, keeps correlations

pub mod mirror_engine;
pub mod relay_dispatcher;
pub mod resolution_queue;

pub use mirror_engine::{Collaborators, MirrorEngine};
pub use relay_dispatcher::{DispatchOutcome, RelayAction, RelayDispatcher, RelayError};
pub use resolution_queue::{ResolutionJob, ResolutionQueue, ResolutionQueueHandle};
