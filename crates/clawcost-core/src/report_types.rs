//! Report data types for clawcost
//!
//! Pure data structures produced by the reporting engine and consumed by the
//! renderers. They carry no behavior beyond serialization.

use crate::filters::Period;
use crate::types::{SessionId, SessionType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Usage of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub agent: String,
    pub sessions: usize,
    /// Total cost in USD
    pub total_cost: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// Usage of one session category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindSummary {
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub sessions: usize,
    pub total_cost: f64,
    pub total_tokens: u64,
}

/// Usage of one scheduled job across its runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledJobSummary {
    pub job_name: String,
    pub job_id: String,
    /// Always at least one for an emitted summary
    pub runs: usize,
    pub total_cost: f64,
    /// `total_cost / runs`
    pub avg_cost: f64,
    /// Most expensive single run
    pub max_cost: f64,
    pub total_tokens: u64,
}

/// Usage of one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Model name, `"unknown"` when the logs named none
    pub model: String,
    pub sessions: usize,
    pub total_cost: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// Usage of one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    /// Date in `YYYY-MM-DD` form
    pub date: String,
    pub sessions: usize,
    pub total_cost: f64,
    pub total_tokens: u64,
}

/// Rule that raised an anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A scheduled job run cost more than the configured threshold
    ExpensiveScheduledJob,
    /// A session used an unusually large number of tokens
    HighTokenCount,
    /// A high-tier model was used for a small request
    ModelOverkill,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExpensiveScheduledJob => "expensive_scheduled_job",
            Self::HighTokenCount => "high_token_count",
            Self::ModelOverkill => "model_overkill",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anomaly severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A flagged session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub description: String,
    pub severity: Severity,
    /// Cost of the triggering session
    pub cost: f64,
    pub session_id: SessionId,
    pub agent: String,
}

/// Per-session line of a full report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    pub id: SessionId,
    pub agent: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    pub model: String,
    pub cost: f64,
    pub tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
}

/// Complete cost report
///
/// Optional lists are `None` when the dimension was not requested, which is
/// different from a requested dimension that came out empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    /// Requested period, `None` (serialized as `null`) when no period was given
    pub period: Option<Period>,
    pub total_cost: f64,
    pub total_tokens: u64,
    pub total_sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_agent: Option<Vec<AgentSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_kind: Option<Vec<KindSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_scheduled_job: Option<Vec<ScheduledJobSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_model: Option<Vec<ModelSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_day: Option<Vec<DaySummary>>,
    pub anomalies: Vec<Anomaly>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<SessionDetail>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_anomaly_serialization() {
        let anomaly = Anomaly {
            kind: AnomalyKind::ExpensiveScheduledJob,
            description: "Scheduled job daily-kickoff exceeded $0.50 threshold".to_string(),
            severity: Severity::Warning,
            cost: 0.6,
            session_id: SessionId::new("run-1"),
            agent: "urza".to_string(),
        };

        let value = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(value["type"], "expensive_scheduled_job");
        assert_eq!(value["severity"], "warning");
        assert_eq!(value["session_id"], "run-1");
        assert_eq!(AnomalyKind::ModelOverkill.to_string(), "model_overkill");
    }

    #[test]
    fn test_report_omits_unrequested_dimensions() {
        let report = Report {
            generated_at: Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap(),
            period: Some(Period::Week),
            total_cost: 0.0,
            total_tokens: 0,
            total_sessions: 0,
            by_agent: Some(vec![]),
            by_kind: Some(vec![]),
            by_scheduled_job: None,
            by_model: Some(vec![]),
            by_day: Some(vec![]),
            anomalies: vec![],
            sessions: None,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["period"], "week");
        assert!(value.get("by_scheduled_job").is_none());
        assert!(value.get("sessions").is_none());
        // Requested but empty stays present
        assert_eq!(value["by_agent"], serde_json::json!([]));
        assert_eq!(value["anomalies"], serde_json::json!([]));
    }

    #[test]
    fn test_report_always_echoes_period() {
        let mut report = Report {
            generated_at: Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap(),
            period: None,
            total_cost: 0.0,
            total_tokens: 0,
            total_sessions: 0,
            by_agent: None,
            by_kind: None,
            by_scheduled_job: None,
            by_model: None,
            by_day: None,
            anomalies: vec![],
            sessions: None,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value.get("period"), Some(&serde_json::Value::Null));

        report.period = Some(Period::All);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["period"], "all");
    }
}
