//! Configuration types shared between the relay core and the server.
//!
//! These map one-to-one onto the `[[mirrors]]` section of the config file.
//! Loading and validation live in the server crate.

mod mirror;

pub use mirror::{FieldSelector, MirrorConfig, Replacer, TransformSettings, WILDCARD};
