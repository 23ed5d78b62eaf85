//! Core domain types for clawcost
//!
//! This module contains the session record consumed by the reporting engine,
//! together with the strongly-typed identifiers, token counts and costs it is
//! made of.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::path::PathBuf;

/// Placeholder used wherever a session carries no model name
pub const UNKNOWN_MODEL: &str = "unknown";

/// Strongly-typed model name wrapper
///
/// The source logs may omit the model entirely, so an empty name is valid
/// and is reported as `"unknown"` by the aggregations.
///
/// # Examples
/// ```
/// use clawcost_core::types::ModelName;
///
/// let model = ModelName::new("anthropic/claude-opus-4");
/// assert_eq!(model.as_str(), "anthropic/claude-opus-4");
/// assert_eq!(ModelName::default().or_unknown(), "unknown");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelName(String);

impl ModelName {
    /// Create a new ModelName from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the source log provided no model
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The model name, or `"unknown"` when empty
    pub fn or_unknown(&self) -> &str {
        if self.0.is_empty() {
            UNKNOWN_MODEL
        } else {
            &self.0
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly-typed session ID wrapper
///
/// Session IDs are opaque and only unique within one agent's log set.
///
/// # Examples
/// ```
/// use clawcost_core::types::SessionId;
///
/// let session = SessionId::new("agent:urza:cron:daily-kickoff-abc123:run:xyz789");
/// assert_eq!(session.as_str(), "agent:urza:cron:daily-kickoff-abc123:run:xyz789");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new SessionId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Session category without its payload
///
/// The declaration order is the report order of the by-kind dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// A session driven by a human operator
    Interactive,
    /// A run of a scheduled (cron) job
    ScheduledJob,
    /// A sub-task spawned by another session
    SubTask,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interactive => write!(f, "interactive"),
            Self::ScheduledJob => write!(f, "scheduled_job"),
            Self::SubTask => write!(f, "sub_task"),
        }
    }
}

/// Session category with the identifiers that only exist for that category
///
/// # Examples
/// ```
/// use clawcost_core::types::{SessionKind, SessionType};
///
/// let kind = SessionKind::scheduled_job("daily-kickoff-abc123", "daily-kickoff");
/// assert_eq!(kind.session_type(), SessionType::ScheduledJob);
/// assert_eq!(kind.job_name(), Some("daily-kickoff"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SessionKind {
    #[default]
    Interactive,
    ScheduledJob {
        /// Raw job identifier from the session key
        job_id: String,
        /// Human-friendly label derived from the id (may equal it)
        job_name: String,
    },
    SubTask {
        task_id: String,
    },
}

impl SessionKind {
    /// Convenience constructor for scheduled job sessions
    pub fn scheduled_job(job_id: impl Into<String>, job_name: impl Into<String>) -> Self {
        Self::ScheduledJob {
            job_id: job_id.into(),
            job_name: job_name.into(),
        }
    }

    /// Convenience constructor for sub-task sessions
    pub fn sub_task(task_id: impl Into<String>) -> Self {
        Self::SubTask {
            task_id: task_id.into(),
        }
    }

    /// The payload-free category
    pub fn session_type(&self) -> SessionType {
        match self {
            Self::Interactive => SessionType::Interactive,
            Self::ScheduledJob { .. } => SessionType::ScheduledJob,
            Self::SubTask { .. } => SessionType::SubTask,
        }
    }

    /// Derived job name for scheduled job sessions
    pub fn job_name(&self) -> Option<&str> {
        match self {
            Self::ScheduledJob { job_name, .. } => Some(job_name),
            _ => None,
        }
    }

    /// Raw job identifier for scheduled job sessions
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::ScheduledJob { job_id, .. } => Some(job_id),
            _ => None,
        }
    }
}

/// Token counts as reported by the source log
///
/// `total_tokens` is taken verbatim from the log and is never recomputed
/// from the other fields.
///
/// # Examples
/// ```
/// use clawcost_core::types::TokenCounts;
///
/// let tokens = TokenCounts::new(100, 50, 150);
/// let combined = tokens + TokenCounts::new(10, 5, 15);
/// assert_eq!(combined.total_tokens, 165);
/// ```
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenCounts {
    /// Input tokens used
    pub input_tokens: u64,
    /// Output tokens generated
    pub output_tokens: u64,
    /// Total tokens reported by the log
    pub total_tokens: u64,
    /// Cache read tokens
    pub cache_read_tokens: u64,
    /// Cache write tokens
    pub cache_write_tokens: u64,
}

impl TokenCounts {
    /// Create new TokenCounts without cache usage
    pub fn new(input_tokens: u64, output_tokens: u64, total_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
            ..Self::default()
        }
    }

    /// Set cache token counts
    pub fn with_cache(mut self, cache_read_tokens: u64, cache_write_tokens: u64) -> Self {
        self.cache_read_tokens = cache_read_tokens;
        self.cache_write_tokens = cache_write_tokens;
        self
    }
}

impl Add for TokenCounts {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl AddAssign for TokenCounts {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
        self.cache_read_tokens += other.cache_read_tokens;
        self.cache_write_tokens += other.cache_write_tokens;
    }
}

/// Costs in USD as reported by the source log
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Cost {
    pub input: f64,
    pub output: f64,
    pub cache_read: f64,
    pub cache_write: f64,
    /// Total cost reported by the log
    pub total: f64,
}

impl Cost {
    /// Cost with only a total
    pub fn total(total: f64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, other: Self) {
        self.input += other.input;
        self.output += other.output;
        self.cache_read += other.cache_read;
        self.cache_write += other.cache_write;
        self.total += other.total;
    }
}

/// Token and cost usage of one session
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    pub tokens: TokenCounts,
    pub cost: Cost,
}

impl AddAssign for Usage {
    fn add_assign(&mut self, other: Self) {
        self.tokens += other.tokens;
        self.cost += other.cost;
    }
}

/// One parsed session, the unit consumed by the reporting engine
///
/// Records are built by the session loader (or by hand in tests) and are
/// only ever read by the engine.
///
/// # Examples
/// ```
/// use clawcost_core::types::{SessionKind, SessionRecord};
/// use chrono::{TimeZone, Utc};
///
/// let session = SessionRecord::new("run-1", "urza")
///     .with_kind(SessionKind::scheduled_job("daily-kickoff-abc123", "daily-kickoff"))
///     .with_model("anthropic/claude-sonnet-4")
///     .with_cost(0.42)
///     .with_total_tokens(12_000)
///     .with_started_at(Utc.with_ymd_and_hms(2026, 2, 10, 16, 53, 15).unwrap());
///
/// assert_eq!(session.cost_total(), 0.42);
/// assert!(session.started_at.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub agent: String,
    pub kind: SessionKind,
    /// May be empty when the log never named a model
    pub model: ModelName,
    pub usage: Usage,
    /// `None` when the start time could not be determined
    pub started_at: Option<DateTime<Utc>>,
    /// Time between first and last message; zero when unknown
    pub duration: TimeDelta,
    /// Transcript the record was parsed from, if any
    pub file_path: Option<PathBuf>,
}

impl SessionRecord {
    /// Create an interactive session with no usage
    pub fn new(id: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            id: SessionId::new(id),
            agent: agent.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: SessionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = ModelName::new(model);
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    /// Set the reported total cost
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.usage.cost.total = cost;
        self
    }

    /// Set the reported total token count
    pub fn with_total_tokens(mut self, tokens: u64) -> Self {
        self.usage.tokens.total_tokens = tokens;
        self
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    pub fn with_duration(mut self, duration: TimeDelta) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_file_path(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }

    /// Payload-free category of this session
    pub fn session_type(&self) -> SessionType {
        self.kind.session_type()
    }

    /// Total cost reported for this session
    pub fn cost_total(&self) -> f64 {
        self.usage.cost.total
    }

    /// Total tokens reported for this session
    pub fn total_tokens(&self) -> u64 {
        self.usage.tokens.total_tokens
    }
}
