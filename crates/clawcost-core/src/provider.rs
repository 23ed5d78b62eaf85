//! Source trait for session loaders
//!
//! This module defines the `SessionSource` trait implemented by ingestion
//! crates. It provides a uniform interface for listing agents and streaming
//! parsed session records to the reporting engine.

use crate::error::Result;
use crate::types::SessionRecord;
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;

/// Trait for loaders that turn on-disk transcripts into session records.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Names of the agents with session data.
    async fn list_agents(&self) -> Result<Vec<String>>;

    /// Stream session records, optionally restricted to one agent.
    fn load_sessions<'a>(
        &'a self,
        agent_filter: Option<&'a str>,
    ) -> Pin<Box<dyn Stream<Item = Result<SessionRecord>> + Send + 'a>>;

    /// Collect every session record, stopping at the first error.
    async fn collect_sessions(&self, agent_filter: Option<&str>) -> Result<Vec<SessionRecord>> {
        let mut stream = self.load_sessions(agent_filter);
        let mut sessions = Vec::new();
        while let Some(session) = stream.next().await {
            sessions.push(session?);
        }
        Ok(sessions)
    }
}
