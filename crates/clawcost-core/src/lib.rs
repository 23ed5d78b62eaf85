//! Core types, traits, and utilities for clawcost
//!
//! This crate provides the session record model, error handling, timezone
//! configuration, period filtering and the report data types shared by the
//! reporting engine, the session loader and the renderers.

pub mod error;
pub mod filters;
pub mod provider;
pub mod report_types;
pub mod timezone;
pub mod types;

// Re-export commonly used types
pub use error::{ClawcostError, Result};
pub use filters::Period;
pub use types::{Cost, ModelName, SessionId, SessionKind, SessionRecord, SessionType, TokenCounts, Usage};
