//! Aggregation module for grouping sessions into report dimensions
//!
//! Each dimension is an independent reducer over the period-filtered
//! session set. Groups are accumulated in first-seen order and then stably
//! sorted, so two groups with the same cost keep the order in which they
//! were first encountered.
//!
//! | Dimension      | Key                      | Order              |
//! |----------------|--------------------------|--------------------|
//! | agent          | agent name               | cost, descending   |
//! | kind           | session type             | declaration order  |
//! | scheduled job  | (job name, job id)       | cost, descending   |
//! | model          | model, `"unknown"` if empty | cost, descending |
//! | day            | local calendar date      | date, ascending    |
//!
//! # Examples
//!
//! ```
//! use clawcost::aggregation::Aggregator;
//! use clawcost::timezone::TimezoneConfig;
//! use clawcost::types::SessionRecord;
//!
//! let sessions = vec![
//!     SessionRecord::new("s1", "urza").with_cost(1.5).with_total_tokens(1000),
//!     SessionRecord::new("s2", "amos").with_cost(3.0).with_total_tokens(2000),
//! ];
//! let filtered: Vec<&SessionRecord> = sessions.iter().collect();
//!
//! let aggregator = Aggregator::new(TimezoneConfig::utc());
//! let by_agent = aggregator.by_agent(&filtered);
//! assert_eq!(by_agent[0].agent, "amos");
//! ```

use crate::report_types::{
    AgentSummary, DaySummary, KindSummary, ModelSummary, ScheduledJobSummary, SessionDetail,
};
use crate::timezone::TimezoneConfig;
use crate::types::SessionRecord;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::hash::Hash;

/// Insertion-ordered accumulator table
///
/// Keys are looked up through a hash index, values are kept in the order
/// their key was first inserted.
struct GroupTable<K, A> {
    index: HashMap<K, usize>,
    groups: Vec<A>,
}

impl<K: Eq + Hash, A> GroupTable<K, A> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn entry(&mut self, key: K, init: impl FnOnce() -> A) -> &mut A {
        let groups = &mut self.groups;
        let slot = *self.index.entry(key).or_insert_with(|| {
            groups.push(init());
            groups.len() - 1
        });
        &mut self.groups[slot]
    }

    fn into_groups(self) -> Vec<A> {
        self.groups
    }
}

/// Stable sort, most expensive first
fn sort_by_cost_desc<T>(items: &mut [T], cost: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| cost(b).total_cmp(&cost(a)));
}

/// Report totals over a session set
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub total_cost: f64,
    pub total_tokens: u64,
    pub total_sessions: usize,
}

impl Totals {
    pub fn from_sessions(sessions: &[&SessionRecord]) -> Self {
        let mut totals = Self::default();
        for session in sessions {
            totals.total_cost += session.cost_total();
            totals.total_tokens += session.total_tokens();
            totals.total_sessions += 1;
        }
        totals
    }
}

/// Dimension reducers over an already filtered session set
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    timezone: TimezoneConfig,
}

impl Aggregator {
    /// Create an aggregator that buckets days in `timezone`
    pub fn new(timezone: TimezoneConfig) -> Self {
        Self { timezone }
    }

    /// Group by agent, most expensive first
    pub fn by_agent(&self, sessions: &[&SessionRecord]) -> Vec<AgentSummary> {
        let mut table = GroupTable::new();

        for session in sessions {
            let summary = table.entry(session.agent.as_str(), || AgentSummary {
                agent: session.agent.clone(),
                sessions: 0,
                total_cost: 0.0,
                input_tokens: 0,
                output_tokens: 0,
                total_tokens: 0,
            });
            summary.sessions += 1;
            summary.total_cost += session.cost_total();
            summary.input_tokens += session.usage.tokens.input_tokens;
            summary.output_tokens += session.usage.tokens.output_tokens;
            summary.total_tokens += session.total_tokens();
        }

        let mut result = table.into_groups();
        sort_by_cost_desc(&mut result, |s| s.total_cost);
        result
    }

    /// Group by session type, in the fixed order interactive, scheduled job, sub-task
    pub fn by_kind(&self, sessions: &[&SessionRecord]) -> Vec<KindSummary> {
        let mut table = GroupTable::new();

        for session in sessions {
            let session_type = session.session_type();
            let summary = table.entry(session_type, || KindSummary {
                session_type,
                sessions: 0,
                total_cost: 0.0,
                total_tokens: 0,
            });
            summary.sessions += 1;
            summary.total_cost += session.cost_total();
            summary.total_tokens += session.total_tokens();
        }

        let mut result = table.into_groups();
        result.sort_by_key(|s| s.session_type);
        result
    }

    /// Group scheduled job runs by job, most expensive first
    ///
    /// Sessions of any other kind are ignored.
    pub fn by_scheduled_job(&self, sessions: &[&SessionRecord]) -> Vec<ScheduledJobSummary> {
        let mut table = GroupTable::new();

        for session in sessions {
            let (Some(job_name), Some(job_id)) = (session.kind.job_name(), session.kind.job_id())
            else {
                continue;
            };

            let cost = session.cost_total();
            let summary = table.entry((job_name, job_id), || ScheduledJobSummary {
                job_name: job_name.to_string(),
                job_id: job_id.to_string(),
                runs: 0,
                total_cost: 0.0,
                avg_cost: 0.0,
                max_cost: 0.0,
                total_tokens: 0,
            });
            summary.runs += 1;
            summary.total_cost += cost;
            summary.total_tokens += session.total_tokens();
            if cost > summary.max_cost {
                summary.max_cost = cost;
            }
        }

        let mut result = table.into_groups();
        for summary in &mut result {
            summary.avg_cost = summary.total_cost / summary.runs as f64;
        }
        sort_by_cost_desc(&mut result, |s| s.total_cost);
        result
    }

    /// Group by model, most expensive first
    pub fn by_model(&self, sessions: &[&SessionRecord]) -> Vec<ModelSummary> {
        let mut table = GroupTable::new();

        for session in sessions {
            let model = session.model.or_unknown();
            let summary = table.entry(model, || ModelSummary {
                model: model.to_string(),
                sessions: 0,
                total_cost: 0.0,
                input_tokens: 0,
                output_tokens: 0,
                total_tokens: 0,
            });
            summary.sessions += 1;
            summary.total_cost += session.cost_total();
            summary.input_tokens += session.usage.tokens.input_tokens;
            summary.output_tokens += session.usage.tokens.output_tokens;
            summary.total_tokens += session.total_tokens();
        }

        let mut result = table.into_groups();
        sort_by_cost_desc(&mut result, |s| s.total_cost);
        result
    }

    /// Group by local start date, oldest first
    ///
    /// Sessions without a start time are not bucketed.
    pub fn by_day(&self, sessions: &[&SessionRecord]) -> Vec<DaySummary> {
        let mut table: GroupTable<NaiveDate, (NaiveDate, DaySummary)> = GroupTable::new();

        for session in sessions {
            let Some(started_at) = session.started_at else {
                continue;
            };
            let date = self.timezone.local_date(&started_at);
            let (_, summary) = table.entry(date, || {
                (
                    date,
                    DaySummary {
                        date: date.format("%Y-%m-%d").to_string(),
                        sessions: 0,
                        total_cost: 0.0,
                        total_tokens: 0,
                    },
                )
            });
            summary.sessions += 1;
            summary.total_cost += session.cost_total();
            summary.total_tokens += session.total_tokens();
        }

        let mut result = table.into_groups();
        result.sort_by_key(|(date, _)| *date);
        result.into_iter().map(|(_, summary)| summary).collect()
    }

    /// One line per session, most expensive first
    pub fn session_details(&self, sessions: &[&SessionRecord]) -> Vec<SessionDetail> {
        let mut result: Vec<SessionDetail> = sessions
            .iter()
            .map(|session| SessionDetail {
                id: session.id.clone(),
                agent: session.agent.clone(),
                session_type: session.session_type(),
                job_name: session.kind.job_name().map(str::to_string),
                model: session.model.or_unknown().to_string(),
                cost: session.cost_total(),
                tokens: session.total_tokens(),
                started_at: session.started_at,
                duration_seconds: session.duration.num_seconds(),
            })
            .collect();

        sort_by_cost_desc(&mut result, |d| d.cost);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SessionKind, SessionType};
    use chrono::{TimeDelta, TimeZone, Utc};

    fn session(id: &str, agent: &str, cost: f64, tokens: u64) -> SessionRecord {
        SessionRecord::new(id, agent)
            .with_cost(cost)
            .with_total_tokens(tokens)
    }

    fn refs(sessions: &[SessionRecord]) -> Vec<&SessionRecord> {
        sessions.iter().collect()
    }

    #[test]
    fn test_group_table_keeps_first_seen_order() {
        let mut table = GroupTable::new();
        for key in ["b", "a", "b", "c", "a"] {
            *table.entry(key, || 0) += 1;
        }
        assert_eq!(table.into_groups(), vec![2, 2, 1]);
    }

    #[test]
    fn test_by_agent() {
        let sessions = vec![
            session("s1", "A", 1.5, 1000),
            session("s2", "A", 0.5, 500),
            session("s3", "B", 3.0, 2000),
        ];

        let by_agent = Aggregator::new(TimezoneConfig::utc()).by_agent(&refs(&sessions));

        assert_eq!(by_agent.len(), 2);
        assert_eq!(by_agent[0].agent, "B");
        assert_eq!(by_agent[0].sessions, 1);
        assert_eq!(by_agent[0].total_cost, 3.0);
        assert_eq!(by_agent[0].total_tokens, 2000);
        assert_eq!(by_agent[1].agent, "A");
        assert_eq!(by_agent[1].sessions, 2);
        assert_eq!(by_agent[1].total_cost, 2.0);
        assert_eq!(by_agent[1].total_tokens, 1500);
    }

    #[test]
    fn test_equal_costs_keep_first_seen_order() {
        let sessions = vec![
            session("s1", "zeta", 1.0, 10),
            session("s2", "alpha", 1.0, 10),
            session("s3", "mid", 2.0, 10),
            session("s4", "omega", 1.0, 10),
        ];

        let by_agent = Aggregator::new(TimezoneConfig::utc()).by_agent(&refs(&sessions));
        let names: Vec<_> = by_agent.iter().map(|a| a.agent.as_str()).collect();
        assert_eq!(names, vec!["mid", "zeta", "alpha", "omega"]);
    }

    #[test]
    fn test_by_kind_fixed_order() {
        let sessions = vec![
            session("t1", "A", 5.0, 10).with_kind(SessionKind::sub_task("t1")),
            session("c1", "A", 1.0, 10).with_kind(SessionKind::scheduled_job("j-abcdef", "j")),
            session("i1", "A", 0.1, 10),
            session("c2", "A", 1.0, 10).with_kind(SessionKind::scheduled_job("j-abcdef", "j")),
        ];

        let by_kind = Aggregator::new(TimezoneConfig::utc()).by_kind(&refs(&sessions));
        let order: Vec<_> = by_kind.iter().map(|k| k.session_type).collect();
        assert_eq!(
            order,
            vec![
                SessionType::Interactive,
                SessionType::ScheduledJob,
                SessionType::SubTask
            ]
        );
        assert_eq!(by_kind[1].sessions, 2);
        assert_eq!(by_kind[2].total_cost, 5.0);
    }

    #[test]
    fn test_by_scheduled_job() {
        let kickoff = SessionKind::scheduled_job("daily-kickoff-abc123", "daily-kickoff");
        let review = SessionKind::scheduled_job("code-review-xyz789", "code-review");
        let sessions = vec![
            session("r1", "urza", 0.2, 100).with_kind(kickoff.clone()),
            session("r2", "urza", 0.6, 300).with_kind(kickoff.clone()),
            session("r3", "urza", 0.1, 50).with_kind(kickoff),
            session("r4", "amos", 2.0, 900).with_kind(review),
            session("i1", "amos", 9.0, 900),
        ];

        let jobs = Aggregator::new(TimezoneConfig::utc()).by_scheduled_job(&refs(&sessions));

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].job_name, "code-review");
        assert_eq!(jobs[0].runs, 1);

        let kickoff = &jobs[1];
        assert_eq!(kickoff.job_id, "daily-kickoff-abc123");
        assert_eq!(kickoff.runs, 3);
        assert!((kickoff.total_cost - 0.9).abs() < 1e-9);
        assert!((kickoff.avg_cost - 0.3).abs() < 1e-9);
        assert_eq!(kickoff.max_cost, 0.6);
        assert_eq!(kickoff.total_tokens, 450);
    }

    #[test]
    fn test_same_job_name_different_ids_are_separate() {
        let sessions = vec![
            session("r1", "urza", 0.2, 100)
                .with_kind(SessionKind::scheduled_job("nightly-aaaaaa", "nightly")),
            session("r2", "urza", 0.2, 100)
                .with_kind(SessionKind::scheduled_job("nightly-bbbbbb", "nightly")),
        ];

        let jobs = Aggregator::new(TimezoneConfig::utc()).by_scheduled_job(&refs(&sessions));
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].job_id, "nightly-aaaaaa");
    }

    #[test]
    fn test_by_model_unknown() {
        let sessions = vec![
            session("s1", "A", 1.0, 10),
            session("s2", "A", 2.0, 10).with_model("claude-opus-4"),
            session("s3", "A", 0.5, 10),
        ];

        let by_model = Aggregator::new(TimezoneConfig::utc()).by_model(&refs(&sessions));
        assert_eq!(by_model.len(), 2);
        assert_eq!(by_model[0].model, "claude-opus-4");
        assert_eq!(by_model[1].model, "unknown");
        assert_eq!(by_model[1].sessions, 2);
        assert_eq!(by_model[1].total_cost, 1.5);
    }

    #[test]
    fn test_by_day_uses_report_timezone() {
        let late_evening_utc = Utc.with_ymd_and_hms(2026, 2, 9, 23, 30, 0).unwrap();
        let sessions = vec![
            session("s1", "A", 1.0, 10).with_started_at(late_evening_utc),
            session("s2", "A", 1.0, 10)
                .with_started_at(Utc.with_ymd_and_hms(2026, 2, 8, 12, 0, 0).unwrap()),
            session("s3", "A", 1.0, 10),
        ];

        let utc_days = Aggregator::new(TimezoneConfig::utc()).by_day(&refs(&sessions));
        let dates: Vec<_> = utc_days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-08", "2026-02-09"]);
        assert_eq!(utc_days.iter().map(|d| d.sessions).sum::<usize>(), 2);

        let tokyo = TimezoneConfig::from_cli(Some("Asia/Tokyo"), false).unwrap();
        let tokyo_days = Aggregator::new(tokyo).by_day(&refs(&sessions));
        let dates: Vec<_> = tokyo_days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-08", "2026-02-10"]);
    }

    #[test]
    fn test_session_details_sorted_by_cost() {
        let sessions = vec![
            session("cheap", "A", 0.1, 10),
            session("pricey", "B", 4.0, 10)
                .with_kind(SessionKind::scheduled_job("job-abcdef", "job"))
                .with_duration(TimeDelta::seconds(95)),
            session("mid", "A", 1.0, 10),
        ];

        let details = Aggregator::new(TimezoneConfig::utc()).session_details(&refs(&sessions));
        let ids: Vec<_> = details.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["pricey", "mid", "cheap"]);
        assert_eq!(details[0].job_name.as_deref(), Some("job"));
        assert_eq!(details[0].duration_seconds, 95);
        assert_eq!(details[1].model, "unknown");
    }

    #[test]
    fn test_totals() {
        let sessions = vec![session("s1", "A", 1.25, 100), session("s2", "B", 0.75, 50)];
        let totals = Totals::from_sessions(&refs(&sessions));
        assert_eq!(totals.total_cost, 2.0);
        assert_eq!(totals.total_tokens, 150);
        assert_eq!(totals.total_sessions, 2);

        assert_eq!(Totals::from_sessions(&[]), Totals::default());
    }
}
