//! Report assembly
//!
//! [`ReportGenerator`] ties the pipeline together: read the clock once,
//! narrow the sessions to the requested period, compute totals and the
//! requested dimensions, then run the anomaly rules.
//!
//! # Examples
//!
//! ```
//! use clawcost::report::{ReportConfig, ReportGenerator};
//! use clawcost::filters::Period;
//! use clawcost::timezone::TimezoneConfig;
//! use clawcost::types::SessionRecord;
//!
//! let sessions = vec![
//!     SessionRecord::new("s1", "A").with_cost(1.5).with_total_tokens(1000),
//!     SessionRecord::new("s2", "A").with_cost(0.5).with_total_tokens(500),
//!     SessionRecord::new("s3", "B").with_cost(3.0).with_total_tokens(2000),
//! ];
//!
//! let config = ReportConfig::default()
//!     .with_period(Period::All)
//!     .with_timezone(TimezoneConfig::utc());
//! let report = ReportGenerator::new(config).generate(&sessions);
//!
//! assert_eq!(report.total_sessions, 3);
//! let by_agent = report.by_agent.unwrap();
//! assert_eq!(by_agent[0].agent, "B");
//! ```

use crate::aggregation::{Aggregator, Totals};
use crate::anomaly::{AnomalyDetector, DEFAULT_ANOMALY_THRESHOLD};
use crate::filters::{Period, PeriodFilter};
use crate::report_types::{
    AgentSummary, Anomaly, DaySummary, KindSummary, ModelSummary, Report, ScheduledJobSummary,
    SessionDetail,
};
use crate::timezone::TimezoneConfig;
use crate::types::SessionRecord;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Options controlling which parts of a report are computed
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Time window, `None` for every session
    pub period: Option<Period>,
    /// Agent the sessions were loaded for
    ///
    /// The loader applies this filter; the generator does not re-apply it.
    pub agent_filter: Option<String>,
    /// Compute the scheduled job breakdown
    pub include_scheduled_jobs: bool,
    /// Compute the model breakdown
    pub include_models: bool,
    /// Include per-session details (implies the scheduled job breakdown)
    pub full: bool,
    /// Cost above which a scheduled job run is flagged
    pub anomaly_threshold: f64,
    /// Timezone for local-day semantics
    pub timezone: TimezoneConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            period: None,
            agent_filter: None,
            include_scheduled_jobs: false,
            include_models: true,
            full: false,
            anomaly_threshold: DEFAULT_ANOMALY_THRESHOLD,
            timezone: TimezoneConfig::default(),
        }
    }
}

impl ReportConfig {
    pub fn with_period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_agent_filter(mut self, agent: impl Into<String>) -> Self {
        self.agent_filter = Some(agent.into());
        self
    }

    pub fn with_scheduled_jobs(mut self, include: bool) -> Self {
        self.include_scheduled_jobs = include;
        self
    }

    pub fn with_models(mut self, include: bool) -> Self {
        self.include_models = include;
        self
    }

    pub fn with_full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    pub fn with_anomaly_threshold(mut self, threshold: f64) -> Self {
        self.anomaly_threshold = threshold;
        self
    }

    pub fn with_timezone(mut self, timezone: TimezoneConfig) -> Self {
        self.timezone = timezone;
        self
    }

    fn wants_scheduled_jobs(&self) -> bool {
        self.include_scheduled_jobs || self.full
    }
}

/// Builds [`Report`] values from session records
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    config: ReportConfig,
    parallel: bool,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            parallel: false,
        }
    }

    /// Run the dimension reducers on the rayon thread pool
    ///
    /// The report is identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Generate a report as of the current time
    pub fn generate(&self, sessions: &[SessionRecord]) -> Report {
        self.generate_at(sessions, Utc::now())
    }

    /// Generate a report as of `now`
    pub fn generate_at(&self, sessions: &[SessionRecord], now: DateTime<Utc>) -> Report {
        let config = &self.config;
        let filtered = PeriodFilter::new(config.period, now, config.timezone).apply(sessions);
        debug!(
            "Period {} kept {} of {} sessions",
            config.period.unwrap_or(Period::All),
            filtered.len(),
            sessions.len()
        );

        let totals = Totals::from_sessions(&filtered);
        let dimensions = if self.parallel {
            self.dimensions_parallel(&filtered)
        } else {
            self.dimensions_sequential(&filtered)
        };

        Report {
            generated_at: now,
            period: config.period,
            total_cost: totals.total_cost,
            total_tokens: totals.total_tokens,
            total_sessions: totals.total_sessions,
            by_agent: Some(dimensions.by_agent),
            by_kind: Some(dimensions.by_kind),
            by_scheduled_job: dimensions.by_scheduled_job,
            by_model: dimensions.by_model,
            by_day: Some(dimensions.by_day),
            anomalies: dimensions.anomalies,
            sessions: dimensions.sessions,
        }
    }

    fn dimensions_sequential(&self, filtered: &[&SessionRecord]) -> Dimensions {
        let aggregator = Aggregator::new(self.config.timezone);
        Dimensions {
            by_agent: aggregator.by_agent(filtered),
            by_kind: aggregator.by_kind(filtered),
            by_scheduled_job: self
                .config
                .wants_scheduled_jobs()
                .then(|| aggregator.by_scheduled_job(filtered)),
            by_model: self
                .config
                .include_models
                .then(|| aggregator.by_model(filtered)),
            by_day: aggregator.by_day(filtered),
            anomalies: AnomalyDetector::new(self.config.anomaly_threshold).detect(filtered),
            sessions: self
                .config
                .full
                .then(|| aggregator.session_details(filtered)),
        }
    }

    fn dimensions_parallel(&self, filtered: &[&SessionRecord]) -> Dimensions {
        let aggregator = Aggregator::new(self.config.timezone);
        let config = &self.config;

        let (((by_agent, by_kind), (by_day, by_model)), ((by_scheduled_job, sessions), anomalies)) =
            rayon::join(
                || {
                    rayon::join(
                        || {
                            rayon::join(
                                || aggregator.by_agent(filtered),
                                || aggregator.by_kind(filtered),
                            )
                        },
                        || {
                            rayon::join(
                                || aggregator.by_day(filtered),
                                || config.include_models.then(|| aggregator.by_model(filtered)),
                            )
                        },
                    )
                },
                || {
                    rayon::join(
                        || {
                            rayon::join(
                                || {
                                    config
                                        .wants_scheduled_jobs()
                                        .then(|| aggregator.by_scheduled_job(filtered))
                                },
                                || config.full.then(|| aggregator.session_details(filtered)),
                            )
                        },
                        || AnomalyDetector::new(config.anomaly_threshold).detect(filtered),
                    )
                },
            );

        Dimensions {
            by_agent,
            by_kind,
            by_scheduled_job,
            by_model,
            by_day,
            anomalies,
            sessions,
        }
    }
}

struct Dimensions {
    by_agent: Vec<AgentSummary>,
    by_kind: Vec<KindSummary>,
    by_scheduled_job: Option<Vec<ScheduledJobSummary>>,
    by_model: Option<Vec<ModelSummary>>,
    by_day: Vec<DaySummary>,
    anomalies: Vec<Anomaly>,
    sessions: Option<Vec<SessionDetail>>,
}
