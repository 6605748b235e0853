use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::{AgentEvent, Strategy};

/// What applying one event did to a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Appended to the log.
    Logged,
    /// A source title not seen before.
    SourceAdded,
    /// A source title already in the set; state unchanged.
    SourceRepeated,
    /// Terminal event; result stored and the session is no longer active.
    Finished,
    /// The session was already inactive; nothing changed.
    Ignored,
}

/// Aggregated state of exactly one mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub task: String,
    pub strategy: Strategy,
    /// Non-terminal events in arrival order (sources excluded).
    pub log: Vec<AgentEvent>,
    /// Unique source titles, first occurrence wins.
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(task: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task: task.into(),
            strategy,
            log: Vec::new(),
            sources: Vec::new(),
            result: None,
            active: true,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Fold one event into the session.
    pub fn apply(&mut self, event: &AgentEvent) -> Applied {
        if !self.active {
            return Applied::Ignored;
        }

        match event {
            AgentEvent::Start { .. }
            | AgentEvent::ToolStart { .. }
            | AgentEvent::ToolEnd { .. }
            | AgentEvent::Error { .. } => {
                self.log.push(event.clone());
                Applied::Logged
            }
            AgentEvent::Source { title } => {
                if self.add_source(title) {
                    Applied::SourceAdded
                } else {
                    Applied::SourceRepeated
                }
            }
            AgentEvent::Complete { result } => {
                self.result = Some(result.clone());
                self.finish();
                Applied::Finished
            }
            AgentEvent::SearchComplete { result, .. } => {
                self.result = Some(serde_json::Value::String(result.clone()));
                self.finish();
                Applied::Finished
            }
        }
    }

    /// Insert a source title; returns false when it was already present.
    pub fn add_source(&mut self, title: &str) -> bool {
        if self.sources.iter().any(|existing| existing == title) {
            return false;
        }
        self.sources.push(title.to_string());
        true
    }

    /// Mark the session as no longer running. Idempotent.
    pub fn finish(&mut self) {
        if self.active {
            self.active = false;
            self.finished_at = Some(Utc::now());
        }
    }

    /// The stored result rendered as display text.
    pub fn result_text(&self) -> Option<String> {
        self.result.as_ref().map(|value| match value {
            serde_json::Value::String(text) => text.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.log.iter().filter_map(|event| match event {
            AgentEvent::Error { message } => Some(message.as_str()),
            _ => None,
        })
    }
}
