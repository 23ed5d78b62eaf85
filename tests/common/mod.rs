//! Common test utilities and helpers for clawcost tests
//!
//! Builders for session records and on-disk agent directories shared by the
//! integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use clawcost::types::{SessionKind, SessionRecord};
use std::path::{Path, PathBuf};

/// Fixed reference instant used as "now" across tests
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap()
}

/// Builder for creating test SessionRecord instances
pub struct SessionBuilder {
    id: String,
    agent: String,
    kind: SessionKind,
    model: String,
    cost: f64,
    tokens: u64,
    started_at: Option<DateTime<Utc>>,
    duration: TimeDelta,
}

impl SessionBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            agent: "urza".to_string(),
            kind: SessionKind::Interactive,
            model: "claude-sonnet-4".to_string(),
            cost: 0.1,
            tokens: 1_000,
            started_at: Some(fixed_now() - TimeDelta::hours(1)),
            duration: TimeDelta::minutes(5),
        }
    }

    pub fn agent(mut self, agent: &str) -> Self {
        self.agent = agent.to_string();
        self
    }

    pub fn scheduled_job(mut self, job_id: &str, job_name: &str) -> Self {
        self.kind = SessionKind::scheduled_job(job_id, job_name);
        self
    }

    pub fn sub_task(mut self, task_id: &str) -> Self {
        self.kind = SessionKind::sub_task(task_id);
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn tokens(mut self, tokens: u64) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    pub fn undated(mut self) -> Self {
        self.started_at = None;
        self
    }

    pub fn build(self) -> SessionRecord {
        let mut session = SessionRecord::new(self.id, self.agent)
            .with_kind(self.kind)
            .with_model(self.model)
            .with_cost(self.cost)
            .with_total_tokens(self.tokens)
            .with_duration(self.duration);
        session.started_at = self.started_at;
        session
    }
}

/// One assistant message line of a transcript
pub fn assistant_line(ts: &str, model: &str, tokens: u64, cost: f64) -> String {
    format!(
        r#"{{"type":"message","timestamp":"{ts}","message":{{"role":"assistant","model":"{model}","usage":{{"input":{tokens},"output":0,"totalTokens":{tokens},"cost":{{"total":{cost}}}}}}}}}"#
    )
}

/// Write a transcript for `agent` under `root`, returning its path
pub fn write_transcript(root: &Path, agent: &str, session_key: &str, lines: &[String]) -> PathBuf {
    let dir = root.join(agent).join("sessions");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{session_key}.jsonl"));
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}
