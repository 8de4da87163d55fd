#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

//! Shared types for the Discord message mirror relay.
//!
//! `objects` holds the wire shapes exchanged with the chat platform, the
//! destination webhooks and the link-resolution service. `config` holds the
//! per-mirror transformation settings. The `client` feature adds typed
//! `reqwest` clients for each of those HTTP surfaces.

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod objects;
