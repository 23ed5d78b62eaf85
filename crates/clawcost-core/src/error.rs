//! Error types for clawcost
//!
//! This module defines the error types used throughout the clawcost crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! The reporting engine itself never fails; these errors come from loading
//! transcripts, validating user input and rendering.
//!
//! # Example
//!
//! ```
//! use clawcost_core::error::{ClawcostError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to ClawcostError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for clawcost operations
#[derive(Error, Debug)]
pub enum ClawcostError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The agents directory does not exist
    #[error("Agents directory not found: {}", .0.display())]
    NoAgentsDirectory(PathBuf),

    /// Unrecognised period label
    #[error("Invalid period: {0} (valid: today, yesterday, week, month, all)")]
    InvalidPeriod(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Parse error with file context
    #[error("Parse error in {file}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in clawcost
///
/// # Example
///
/// ```
/// use clawcost_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, ClawcostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ClawcostError::InvalidPeriod("fortnight".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid period: fortnight (valid: today, yesterday, week, month, all)"
        );

        let error = ClawcostError::NoAgentsDirectory(PathBuf::from("/nowhere/agents"));
        assert_eq!(error.to_string(), "Agents directory not found: /nowhere/agents");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let clawcost_error: ClawcostError = io_error.into();
        assert!(matches!(clawcost_error, ClawcostError::Io(_)));
    }
}
