//! Rule-based anomaly detection
//!
//! Three independent rules run over the filtered session set. Their flags
//! are concatenated in rule order, and each rule reports sessions in input
//! order, so a session can appear under more than one rule.

use crate::report_types::{Anomaly, AnomalyKind, Severity};
use crate::types::SessionRecord;
use tracing::debug;

/// Default cost above which a scheduled job run is flagged, in USD
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 0.50;

/// Sessions above this many tokens are flagged
pub const HIGH_TOKEN_THRESHOLD: u64 = 100_000;

/// High-tier model sessions below this many tokens are flagged
pub const SMALL_REQUEST_TOKENS: u64 = 5_000;

/// Model name fragments that mark a high-tier model, matched case sensitively
pub const HIGH_TIER_MODEL_FRAGMENTS: [&str; 3] = ["opus", "claude-opus", "claude-3-opus"];

/// Whether a model name contains one of [`HIGH_TIER_MODEL_FRAGMENTS`]
pub fn is_high_tier_model(model: &str) -> bool {
    HIGH_TIER_MODEL_FRAGMENTS
        .iter()
        .any(|fragment| model.contains(fragment))
}

/// Anomaly detector with a configurable scheduled job cost threshold
#[derive(Debug, Clone, Copy)]
pub struct AnomalyDetector {
    threshold: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(DEFAULT_ANOMALY_THRESHOLD)
    }
}

impl AnomalyDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Run every rule over `sessions`
    pub fn detect(&self, sessions: &[&SessionRecord]) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        self.expensive_scheduled_jobs(sessions, &mut anomalies);
        Self::high_token_counts(sessions, &mut anomalies);
        Self::model_overkill(sessions, &mut anomalies);

        debug!(
            "Detected {} anomalies in {} sessions",
            anomalies.len(),
            sessions.len()
        );
        anomalies
    }

    fn expensive_scheduled_jobs(&self, sessions: &[&SessionRecord], out: &mut Vec<Anomaly>) {
        for session in sessions {
            let Some(job_name) = session.kind.job_name() else {
                continue;
            };
            if session.cost_total() > self.threshold {
                out.push(flag(
                    session,
                    AnomalyKind::ExpensiveScheduledJob,
                    Severity::Warning,
                    format!(
                        "Scheduled job {job_name} exceeded ${:.2} threshold",
                        self.threshold
                    ),
                ));
            }
        }
    }

    fn high_token_counts(sessions: &[&SessionRecord], out: &mut Vec<Anomaly>) {
        for session in sessions {
            let tokens = session.total_tokens();
            if tokens > HIGH_TOKEN_THRESHOLD {
                out.push(flag(
                    session,
                    AnomalyKind::HighTokenCount,
                    Severity::Warning,
                    format!("Session has unusually high token count ({tokens})"),
                ));
            }
        }
    }

    fn model_overkill(sessions: &[&SessionRecord], out: &mut Vec<Anomaly>) {
        for session in sessions {
            let tokens = session.total_tokens();
            if is_high_tier_model(session.model.as_str()) && tokens < SMALL_REQUEST_TOKENS {
                out.push(flag(
                    session,
                    AnomalyKind::ModelOverkill,
                    Severity::Info,
                    format!(
                        "High-tier model used for small request ({tokens} tokens), consider cheaper model"
                    ),
                ));
            }
        }
    }
}

fn flag(
    session: &SessionRecord,
    kind: AnomalyKind,
    severity: Severity,
    description: String,
) -> Anomaly {
    Anomaly {
        kind,
        description,
        severity,
        cost: session.cost_total(),
        session_id: session.id.clone(),
        agent: session.agent.clone(),
    }
}
