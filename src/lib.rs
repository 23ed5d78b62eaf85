//! clawcost - Cost reports for OpenClaw agent sessions
//!
//! This library provides functionality to:
//! - Narrow session records to a reporting period
//! - Break costs down by agent, session type, scheduled job, model and day
//! - Flag expensive or unusual sessions
//! - Render reports as tables or JSON
//!
//! Session records come from a [`provider::SessionSource`], normally the
//! `clawcost-provider-openclaw` loader.
//!
//! # Examples
//!
//! ```no_run
//! use clawcost::{
//!     filters::Period,
//!     output::get_formatter,
//!     provider::SessionSource,
//!     report::{ReportConfig, ReportGenerator},
//! };
//! use clawcost_provider_openclaw::SessionLoader;
//!
//! #[tokio::main]
//! async fn main() -> clawcost::Result<()> {
//!     let loader = SessionLoader::discover(None)?;
//!     let sessions = loader.collect_sessions(None).await?;
//!
//!     let config = ReportConfig::default().with_period(Period::Week);
//!     let report = ReportGenerator::new(config).generate(&sessions);
//!
//!     println!("{}", get_formatter(false, true).format_report(&report)?);
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod anomaly;
pub mod cli;
pub mod output;
pub mod report;

// Re-export core modules
pub use clawcost_core::{error, filters, provider, report_types, timezone, types};

// Re-export commonly used types
pub use clawcost_core::{ClawcostError, Period, Result};
pub use report::{ReportConfig, ReportGenerator};
pub use report_types::Report;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
