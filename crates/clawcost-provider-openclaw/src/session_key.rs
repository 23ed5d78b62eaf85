//! Session key parsing
//!
//! OpenClaw names each transcript after its session key, which encodes the
//! session category:
//!
//! - `agent:{name}:cron:{job_id}:run:{run_id}` is a scheduled job run
//! - `agent:{name}:subagent:{task_id}` is a sub-task
//! - anything else (usually `agent:{name}` or a bare id) is interactive
//!
//! # Examples
//!
//! ```
//! use clawcost_provider_openclaw::session_key::parse_session_key;
//! use clawcost_core::SessionKind;
//!
//! let kind = parse_session_key("agent:urza:cron:daily-kickoff-abc123:run:xyz789");
//! assert_eq!(kind, SessionKind::scheduled_job("daily-kickoff-abc123", "daily-kickoff"));
//! ```

use clawcost_core::SessionKind;

/// Minimum length of a trailing id segment that is stripped from job names
const HASH_SUFFIX_MIN_LEN: usize = 6;

/// Classify a session key
pub fn parse_session_key(key: &str) -> SessionKind {
    let Some(rest) = key.strip_prefix("agent:") else {
        return SessionKind::Interactive;
    };

    let parts: Vec<&str> = rest.splitn(5, ':').collect();
    if let [name, "cron", job_id, "run", run_id] = parts.as_slice()
        && !name.is_empty()
        && !job_id.is_empty()
        && !run_id.is_empty()
    {
        return SessionKind::scheduled_job(*job_id, derive_job_name(job_id));
    }

    let parts: Vec<&str> = rest.splitn(3, ':').collect();
    if let [name, "subagent", task_id] = parts.as_slice()
        && !name.is_empty()
        && !task_id.is_empty()
    {
        return SessionKind::sub_task(*task_id);
    }

    SessionKind::Interactive
}

/// Human-friendly name for a job id
///
/// A trailing `-`-separated segment of at least six ASCII alphanumerics is
/// treated as a generated suffix and dropped: `daily-kickoff-abc123` becomes
/// `daily-kickoff`. Otherwise the id is returned unchanged.
pub fn derive_job_name(job_id: &str) -> String {
    if let Some((head, last)) = job_id.rsplit_once('-')
        && last.len() >= HASH_SUFFIX_MIN_LEN
        && last.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return head.to_string();
    }
    job_id.to_string()
}
