//! Data loader for discovering and parsing OpenClaw session transcripts
//!
//! Transcripts live under `<agents_dir>/<agent>/sessions/*.jsonl`, one file
//! per session, next to an optional `sessions.json` index. Each transcript
//! line is a JSON event; assistant messages carry the usage and cost figures
//! that are summed into one [`SessionRecord`].
//!
//! The agents directory defaults to `~/.openclaw/agents` and can be
//! overridden with the `CLAWCOST_AGENTS_DIR` environment variable or an
//! explicit path.
//!
//! # Examples
//!
//! ```no_run
//! use clawcost_provider_openclaw::SessionLoader;
//! use futures::StreamExt;
//!
//! # async fn example() -> clawcost_core::Result<()> {
//! let loader = SessionLoader::discover(None)?;
//!
//! let sessions = loader.load_sessions(Some("urza"));
//! tokio::pin!(sessions);
//! while let Some(result) = sessions.next().await {
//!     let session = result?;
//!     println!("{}: ${:.4}", session.id, session.cost_total());
//! }
//! # Ok(())
//! # }
//! ```

use crate::session_key::parse_session_key;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use clawcost_core::error::{ClawcostError, Result};
use clawcost_core::provider::SessionSource;
use clawcost_core::types::{Cost, ModelName, SessionRecord, TokenCounts, Usage};
use futures::StreamExt;
use futures::stream::Stream;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::ReadDirStream;
use tracing::{debug, info, trace, warn};

/// Environment variable overriding the agents directory
pub const AGENTS_DIR_ENV: &str = "CLAWCOST_AGENTS_DIR";

const SESSIONS_DIR: &str = "sessions";
const INDEX_FILE: &str = "sessions.json";

/// One line of a session transcript
#[derive(Debug, Deserialize)]
struct TranscriptLine {
    #[serde(rename = "type", default)]
    line_type: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    message: Option<TranscriptMessage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    usage: RawUsage,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawUsage {
    input: u64,
    output: u64,
    total_tokens: u64,
    cache_read: u64,
    cache_write: u64,
    cost: RawCost,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawCost {
    input: f64,
    output: f64,
    cache_read: f64,
    cache_write: f64,
    total: f64,
}

impl From<RawUsage> for Usage {
    fn from(raw: RawUsage) -> Self {
        Usage {
            tokens: TokenCounts::new(raw.input, raw.output, raw.total_tokens)
                .with_cache(raw.cache_read, raw.cache_write),
            cost: Cost {
                input: raw.cost.input,
                output: raw.cost.output,
                cache_read: raw.cost.cache_read,
                cache_write: raw.cost.cache_write,
                total: raw.cost.total,
            },
        }
    }
}

/// Last-update times from an agent's `sessions.json`
///
/// Entries are addressable both by their session key and by the
/// `sessionId` they point at.
#[derive(Debug, Default)]
struct SessionIndex {
    updated_at: HashMap<String, DateTime<Utc>>,
}

impl SessionIndex {
    fn parse(content: &str) -> Result<Self> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(content)?;
        let mut updated_at = HashMap::new();

        for (key, value) in raw {
            let Some(ts) = value
                .get("updatedAt")
                .and_then(|v| v.as_f64())
                .and_then(|ms| DateTime::from_timestamp_millis(ms as i64))
            else {
                continue;
            };
            if let Some(session_id) = value.get("sessionId").and_then(|v| v.as_str()) {
                updated_at.insert(session_id.to_string(), ts);
            }
            updated_at.insert(key, ts);
        }

        Ok(Self { updated_at })
    }

    fn lookup(&self, session_id: &str) -> Option<DateTime<Utc>> {
        self.updated_at.get(session_id).copied()
    }
}

/// Loader for OpenClaw session transcripts
pub struct SessionLoader {
    /// Directory holding one subdirectory per agent
    agents_dir: PathBuf,
    /// Whether to show a progress spinner
    show_progress: bool,
}

impl SessionLoader {
    /// Create a loader for an explicit agents directory
    ///
    /// # Errors
    ///
    /// Returns [`ClawcostError::NoAgentsDirectory`] if the directory does not exist
    pub fn new(agents_dir: impl Into<PathBuf>) -> Result<Self> {
        let agents_dir = agents_dir.into();
        if !agents_dir.is_dir() {
            return Err(ClawcostError::NoAgentsDirectory(agents_dir));
        }

        debug!("Using agents directory {}", agents_dir.display());
        Ok(Self {
            agents_dir,
            show_progress: false,
        })
    }

    /// Create a loader, resolving the agents directory
    ///
    /// Resolution order: `explicit`, then `CLAWCOST_AGENTS_DIR`, then
    /// `~/.openclaw/agents`.
    pub fn discover(explicit: Option<PathBuf>) -> Result<Self> {
        Self::new(Self::resolve_agents_dir(explicit)?)
    }

    /// Resolve the agents directory without checking that it exists
    pub fn resolve_agents_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path);
        }

        if let Ok(custom_path) = std::env::var(AGENTS_DIR_ENV)
            && !custom_path.is_empty()
        {
            return Ok(PathBuf::from(custom_path));
        }

        dirs::home_dir()
            .map(|home| home.join(".openclaw").join("agents"))
            .ok_or_else(|| {
                ClawcostError::InvalidArgument(
                    "cannot determine home directory, pass --agents-dir".to_string(),
                )
            })
    }

    /// Enable or disable the progress spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// The agents directory in use
    pub fn agents_dir(&self) -> &Path {
        &self.agents_dir
    }

    fn sessions_dir(&self, agent: &str) -> PathBuf {
        self.agents_dir.join(agent).join(SESSIONS_DIR)
    }

    /// List agents, sorted by name
    ///
    /// Only subdirectories that contain a `sessions` directory count as agents.
    pub async fn list_agents(&self) -> Result<Vec<String>> {
        let read_dir = tokio::fs::read_dir(&self.agents_dir).await?;
        let mut entries = ReadDirStream::new(read_dir);
        let mut agents = Vec::new();

        while let Some(entry) = entries.next().await {
            let entry = entry?;
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let has_sessions = tokio::fs::metadata(entry.path().join(SESSIONS_DIR))
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if has_sessions {
                agents.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        agents.sort();
        debug!("Found {} agents", agents.len());
        Ok(agents)
    }

    /// Find an agent's transcript files, sorted by file name
    async fn find_session_files(&self, agent: &str) -> Result<Vec<PathBuf>> {
        let sessions_dir = self.sessions_dir(agent);
        let files = tokio::task::spawn_blocking(move || -> Result<Vec<PathBuf>> {
            use walkdir::WalkDir;
            let mut files = Vec::new();

            for entry in WalkDir::new(&sessions_dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(std::io::Error::from)?;
                let path = entry.path();
                if entry.file_type().is_file()
                    && path.extension().and_then(|s| s.to_str()) == Some("jsonl")
                {
                    files.push(path.to_path_buf());
                }
            }
            Ok(files)
        })
        .await
        .map_err(|e| ClawcostError::Io(std::io::Error::other(e.to_string())))??;

        trace!("Found {} transcripts for agent {}", files.len(), agent);
        Ok(files)
    }

    /// Read an agent's session index, empty when missing or unreadable
    async fn read_index(&self, agent: &str) -> SessionIndex {
        let path = self.sessions_dir(agent).join(INDEX_FILE);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                trace!("No session index at {}: {}", path.display(), e);
                return SessionIndex::default();
            }
        };

        SessionIndex::parse(&content).unwrap_or_else(|e| {
            debug!("Ignoring malformed session index {}: {}", path.display(), e);
            SessionIndex::default()
        })
    }

    /// Parse one transcript into a session record
    async fn parse_session_file(
        &self,
        agent: &str,
        path: &Path,
        index: &SessionIndex,
    ) -> Result<SessionRecord> {
        let session_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ClawcostError::Parse {
                file: path.to_path_buf(),
                error: "file name is not valid UTF-8".to_string(),
            })?
            .to_string();

        let file = tokio::fs::File::open(path).await?;
        let mut lines = BufReader::new(file).lines();

        let mut usage = Usage::default();
        let mut model = ModelName::default();
        let mut first_ts: Option<DateTime<Utc>> = None;
        let mut last_ts: Option<DateTime<Utc>> = None;
        let mut line_number = 0;

        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }

            let event = match serde_json::from_str::<TranscriptLine>(&line) {
                Ok(event) => event,
                Err(e) => {
                    trace!(
                        "Skipping malformed line {} in {}: {}",
                        line_number,
                        path.display(),
                        e
                    );
                    continue;
                }
            };

            let Some(message) = event.message else {
                continue;
            };
            if event.line_type != "message" || message.role != "assistant" {
                continue;
            }

            if let Some(ts) = event.timestamp {
                first_ts.get_or_insert(ts);
                last_ts = Some(ts);
            }

            usage += Usage::from(message.usage);

            if let Some(name) = message.model.filter(|m| !m.is_empty()) {
                model = ModelName::new(name);
            } else if let Some(name) = event.model.filter(|m| !m.is_empty()) {
                model = ModelName::new(name);
            }
        }

        let mut session = SessionRecord::new(session_id.as_str(), agent)
            .with_kind(parse_session_key(&session_id))
            .with_usage(usage)
            .with_file_path(path.to_path_buf());
        session.model = model;

        match (first_ts, last_ts) {
            (Some(first), Some(last)) => {
                session.started_at = Some(first);
                session.duration = last - first;
            }
            _ => {
                session.started_at = index.lookup(&session_id);
                session.duration = TimeDelta::zero();
            }
        }

        Ok(session)
    }

    /// Stream session records for every agent, or only `agent_filter`
    ///
    /// Agents whose sessions directory cannot be read and transcripts that
    /// cannot be opened are logged and skipped. Failing to list the agents
    /// directory itself is yielded as an error.
    pub fn load_sessions<'a>(
        &'a self,
        agent_filter: Option<&'a str>,
    ) -> impl Stream<Item = Result<SessionRecord>> + Send + 'a {
        async_stream::stream! {
            let agents = match self.list_agents().await {
                Ok(agents) => agents,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let progress = if self.show_progress {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {msg} [{elapsed_precise}] {pos} sessions")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb.set_message("Loading sessions");
                pb.enable_steady_tick(std::time::Duration::from_millis(100));
                Some(pb)
            } else {
                None
            };

            let mut loaded = 0usize;
            for agent in agents {
                if agent_filter.is_some_and(|wanted| wanted != agent) {
                    continue;
                }

                let files = match self.find_session_files(&agent).await {
                    Ok(files) => files,
                    Err(e) => {
                        warn!("Failed to read sessions for agent {}: {}", agent, e);
                        continue;
                    }
                };
                let index = self.read_index(&agent).await;

                for path in files {
                    match self.parse_session_file(&agent, &path, &index).await {
                        Ok(session) => {
                            loaded += 1;
                            if let Some(ref pb) = progress {
                                pb.inc(1);
                            }
                            yield Ok(session);
                        }
                        Err(e) => warn!("Failed to parse session {}: {}", path.display(), e),
                    }
                }
            }

            info!("Loaded {} sessions from {}", loaded, self.agents_dir.display());
            if let Some(pb) = progress {
                pb.finish_and_clear();
            }
        }
    }
}

#[async_trait]
impl SessionSource for SessionLoader {
    async fn list_agents(&self) -> Result<Vec<String>> {
        SessionLoader::list_agents(self).await
    }

    fn load_sessions<'a>(
        &'a self,
        agent_filter: Option<&'a str>,
    ) -> Pin<Box<dyn Stream<Item = Result<SessionRecord>> + Send + 'a>> {
        Box::pin(SessionLoader::load_sessions(self, agent_filter))
    }
}
