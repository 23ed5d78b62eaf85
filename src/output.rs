//! Output formatting module for clawcost
//!
//! This module renders a finished [`Report`] for display:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use clawcost::output::get_formatter;
//! use clawcost::report::{ReportConfig, ReportGenerator};
//! use clawcost::timezone::TimezoneConfig;
//! use clawcost::types::SessionRecord;
//!
//! let sessions = vec![SessionRecord::new("s1", "urza").with_cost(0.25).with_total_tokens(1500)];
//! let report = ReportGenerator::new(ReportConfig::default().with_timezone(TimezoneConfig::utc()))
//!     .generate(&sessions);
//!
//! let table = get_formatter(false, false).format_report(&report).unwrap();
//! assert!(table.contains("urza"));
//!
//! let json = get_formatter(true, false).format_report(&report).unwrap();
//! assert!(json.contains("\"total_sessions\": 1"));
//! ```

use crate::error::Result;
use crate::report_types::{Anomaly, Report, Severity};
use colored::Colorize;
use prettytable::{Table, format, row};
use serde_json::json;

/// Session details are listed only for reports with at most this many sessions
const MAX_DETAILED_SESSIONS: usize = 20;
/// Number of sessions shown in the most expensive sessions table
const TOP_SESSIONS: usize = 10;

const JOB_NAME_WIDTH: usize = 25;
const MODEL_NAME_WIDTH: usize = 35;
const SESSION_MODEL_WIDTH: usize = 20;

/// Format a USD amount, with extra precision below one cent
pub fn format_cost(cost: f64) -> String {
    if cost < 0.01 {
        format!("${cost:.4}")
    } else {
        format!("${cost:.2}")
    }
}

/// Format a token count with a `k` or `M` suffix
pub fn format_tokens(tokens: u64) -> String {
    if tokens >= 1_000_000 {
        format!("{:.2}M", tokens as f64 / 1_000_000.0)
    } else if tokens >= 1_000 {
        format!("{:.1}k", tokens as f64 / 1_000.0)
    } else {
        tokens.to_string()
    }
}

/// Shorten `name` to at most `width` characters, ending in `...` when cut
pub fn truncate_name(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let kept: String = name.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a cost report
    fn format_report(&self, report: &Report) -> Result<String>;

    /// Format the list of known agents
    fn format_agents(&self, agents: &[String]) -> Result<String>;
}

/// Table formatter for human-readable output
pub struct TableFormatter {
    /// Whether severity markers are coloured
    pub colored: bool,
}

impl TableFormatter {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }

    fn section(&self, output: &mut String, title: &str, table: &Table) {
        let heading = if self.colored {
            title.bold().to_string()
        } else {
            title.to_string()
        };
        output.push_str(&format!("\n{heading}\n"));
        output.push_str(&table.to_string());
    }

    fn severity_marker(&self, severity: Severity) -> String {
        let label = match severity {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
        };
        if !self.colored {
            return label.to_string();
        }
        match severity {
            Severity::Info => label.cyan().to_string(),
            Severity::Warning => label.yellow().to_string(),
            Severity::Error => label.red().bold().to_string(),
        }
    }

    fn anomaly_table(&self, anomalies: &[Anomaly]) -> Table {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Severity",
            b -> "Type",
            b -> "Description",
            b -> "Cost",
            b -> "Agent",
            b -> "Session"
        ]);
        for anomaly in anomalies {
            table.add_row(row![
                self.severity_marker(anomaly.severity),
                anomaly.kind,
                anomaly.description,
                r -> format_cost(anomaly.cost),
                anomaly.agent,
                anomaly.session_id
            ]);
        }
        table
    }
}

impl OutputFormatter for TableFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        output.push_str("OpenClaw Cost Report\n");
        output.push_str(&format!("Generated: {}\n", report.generated_at.to_rfc3339()));
        if let Some(period) = report.period {
            output.push_str(&format!("Period:    {period}\n"));
        }

        let mut summary = Self::new_table();
        summary.set_titles(row![b -> "Sessions", b -> "Cost", b -> "Tokens"]);
        summary.add_row(row![
            r -> report.total_sessions,
            r -> format_cost(report.total_cost),
            r -> format_tokens(report.total_tokens)
        ]);
        self.section(&mut output, "Summary", &summary);

        if let Some(by_agent) = report.by_agent.as_ref().filter(|v| !v.is_empty()) {
            let mut table = Self::new_table();
            table.set_titles(row![b -> "Agent", b -> "Sessions", b -> "Cost", b -> "Tokens"]);
            for agent in by_agent {
                table.add_row(row![
                    agent.agent,
                    r -> agent.sessions,
                    r -> format_cost(agent.total_cost),
                    r -> format_tokens(agent.total_tokens)
                ]);
            }
            self.section(&mut output, "By Agent", &table);
        }

        if let Some(by_kind) = report.by_kind.as_ref().filter(|v| !v.is_empty()) {
            let mut table = Self::new_table();
            table.set_titles(row![b -> "Type", b -> "Sessions", b -> "Cost", b -> "Tokens"]);
            for kind in by_kind {
                table.add_row(row![
                    kind.session_type,
                    r -> kind.sessions,
                    r -> format_cost(kind.total_cost),
                    r -> format_tokens(kind.total_tokens)
                ]);
            }
            self.section(&mut output, "By Session Type", &table);
        }

        if let Some(jobs) = report.by_scheduled_job.as_ref().filter(|v| !v.is_empty()) {
            let mut table = Self::new_table();
            table.set_titles(row![
                b -> "Scheduled Job",
                b -> "Runs",
                b -> "Total",
                b -> "Avg",
                b -> "Max"
            ]);
            for job in jobs {
                table.add_row(row![
                    truncate_name(&job.job_name, JOB_NAME_WIDTH),
                    r -> job.runs,
                    r -> format_cost(job.total_cost),
                    r -> format_cost(job.avg_cost),
                    r -> format_cost(job.max_cost)
                ]);
            }
            self.section(&mut output, "By Scheduled Job", &table);
        }

        if let Some(by_model) = report.by_model.as_ref().filter(|v| !v.is_empty()) {
            let mut table = Self::new_table();
            table.set_titles(row![b -> "Model", b -> "Sessions", b -> "Cost", b -> "Tokens"]);
            for model in by_model {
                table.add_row(row![
                    truncate_name(&model.model, MODEL_NAME_WIDTH),
                    r -> model.sessions,
                    r -> format_cost(model.total_cost),
                    r -> format_tokens(model.total_tokens)
                ]);
            }
            self.section(&mut output, "By Model", &table);
        }

        // A single day is already covered by the summary
        if let Some(by_day) = report.by_day.as_ref().filter(|v| v.len() > 1) {
            let mut table = Self::new_table();
            table.set_titles(row![b -> "Date", b -> "Sessions", b -> "Cost", b -> "Tokens"]);
            for day in by_day {
                table.add_row(row![
                    day.date,
                    r -> day.sessions,
                    r -> format_cost(day.total_cost),
                    r -> format_tokens(day.total_tokens)
                ]);
            }
            self.section(&mut output, "Daily Trend", &table);
        }

        if !report.anomalies.is_empty() {
            let table = self.anomaly_table(&report.anomalies);
            self.section(&mut output, "Anomalies", &table);
        }

        if let Some(sessions) = report
            .sessions
            .as_ref()
            .filter(|v| !v.is_empty() && v.len() <= MAX_DETAILED_SESSIONS)
        {
            let mut table = Self::new_table();
            table.set_titles(row![
                b -> "Agent",
                b -> "Type",
                b -> "Cost",
                b -> "Tokens",
                b -> "Model"
            ]);
            for session in sessions.iter().take(TOP_SESSIONS) {
                table.add_row(row![
                    session.agent,
                    session.session_type,
                    r -> format_cost(session.cost),
                    r -> format_tokens(session.tokens),
                    truncate_name(&session.model, SESSION_MODEL_WIDTH)
                ]);
            }
            self.section(&mut output, "Top Expensive Sessions", &table);
        }

        Ok(output)
    }

    fn format_agents(&self, agents: &[String]) -> Result<String> {
        if agents.is_empty() {
            return Ok("No agents found\n".to_string());
        }

        let mut table = Self::new_table();
        table.set_titles(row![b -> "Agent"]);
        for agent in agents {
            table.add_row(row![agent]);
        }
        Ok(table.to_string())
    }
}

/// JSON formatter for machine-readable output
///
/// Dimensions that were not requested are omitted from the document.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    fn format_agents(&self, agents: &[String]) -> Result<String> {
        Ok(serde_json::to_string_pretty(&json!({ "agents": agents }))?)
    }
}

/// Get the formatter for the requested output mode
pub fn get_formatter(json: bool, colored: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(colored))
    }
}
