//! CLI interface for clawcost
//!
//! This module defines the command-line interface using clap.
//!
//! # Example
//!
//! ```bash
//! # Cost report for the last seven days
//! clawcost report --period week
//!
//! # One agent, with scheduled job breakdown, as JSON
//! clawcost report --agent urza --crons --json
//!
//! # Every session, flagging scheduled job runs above $0.25
//! clawcost report --full --threshold 0.25
//! ```

use crate::anomaly::DEFAULT_ANOMALY_THRESHOLD;
use crate::filters::Period;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Cost reports for OpenClaw agent sessions
#[derive(Parser, Debug, Clone)]
#[command(name = "clawcost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory holding one subdirectory per agent (default: ~/.openclaw/agents)
    #[arg(long, global = true, env = "CLAWCOST_AGENTS_DIR")]
    pub agents_dir: Option<PathBuf>,

    /// Timezone for day boundaries (e.g. "America/New_York", "Asia/Tokyo", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Use UTC for day boundaries (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a cost report
    Report(ReportArgs),

    /// List agents with session data
    Agents {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Arguments for the report command
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Time period (today, yesterday, week, month, all)
    ///
    /// An empty value reports every session.
    // Fully qualified so clap takes the parser's `Option<Period>` as the value
    #[arg(
        long,
        short = 'p',
        value_parser = parse_period,
        default_value = "",
        hide_default_value = true
    )]
    pub period: std::option::Option<Period>,

    /// Only include sessions of this agent
    #[arg(long, short = 'a')]
    pub agent: Option<String>,

    /// Include the scheduled job breakdown
    #[arg(long)]
    pub crons: bool,

    /// Skip the model breakdown
    #[arg(long)]
    pub skip_models: bool,

    /// Include every session (implies --crons)
    #[arg(long)]
    pub full: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Cost in USD above which a scheduled job run is flagged
    #[arg(long, default_value_t = DEFAULT_ANOMALY_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: f64,

    /// Compute report dimensions in parallel
    #[arg(long)]
    pub parallel: bool,
}

fn parse_period(s: &str) -> Result<Option<Period>, String> {
    if s.is_empty() {
        return Ok(None);
    }
    s.parse()
        .map(Some)
        .map_err(|e: crate::error::ClawcostError| e.to_string())
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("threshold must be a non-negative number, got {s}"))
    }
}
