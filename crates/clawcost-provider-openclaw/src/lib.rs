//! OpenClaw provider for clawcost
//!
//! This crate discovers agent session transcripts on disk, parses them and
//! turns each transcript into a [`clawcost_core::SessionRecord`].

pub mod data_loader;
pub mod session_key;

#[cfg(test)]
pub mod test_utils;

pub use data_loader::SessionLoader;
