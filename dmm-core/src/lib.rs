#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod audit;
pub mod config;
pub mod entities;
pub mod events;
pub mod framework;
pub mod processors;
pub mod resolution;
pub mod utils;
