use serde::{Deserialize, Serialize};

/// Progress event emitted by the task-execution backend for one mission.
///
/// The wire form is a JSON object whose `type` field selects the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Mission accepted; the backend assigned a thread (and optionally a history run) id.
    Start {
        thread_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_id: Option<String>,
    },

    ToolStart {
        tool: String,
        #[serde(default)]
        input: serde_json::Value,
    },

    ToolEnd {
        tool: String,
        #[serde(default)]
        output: serde_json::Value,
    },

    /// A citation became available. Titles may repeat within one stream.
    Source { title: String },

    /// Terminal event of the general path.
    Complete { result: serde_json::Value },

    /// Terminal event of the fast path.
    SearchComplete { result: String, total_results: u64 },

    Error { message: String },
}

impl AgentEvent {
    pub fn error(message: impl Into<String>) -> Self {
        AgentEvent::Error {
            message: message.into(),
        }
    }

    /// Whether this event concludes the mission.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentEvent::Complete { .. } | AgentEvent::SearchComplete { .. }
        )
    }

    /// The wire discriminator of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentEvent::Start { .. } => "start",
            AgentEvent::ToolStart { .. } => "tool_start",
            AgentEvent::ToolEnd { .. } => "tool_end",
            AgentEvent::Source { .. } => "source",
            AgentEvent::Complete { .. } => "complete",
            AgentEvent::SearchComplete { .. } => "search_complete",
            AgentEvent::Error { .. } => "error",
        }
    }
}

/// Execution strategy chosen for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Single-shot knowledge-base search.
    Fast,
    /// Streaming agent execution.
    General,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Fast => "fast",
            Strategy::General => "general",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_without_run_id_deserializes() {
        let event: AgentEvent =
            serde_json::from_value(json!({"type": "start", "thread_id": "t-1"})).unwrap();
        assert_eq!(
            event,
            AgentEvent::Start {
                thread_id: "t-1".to_string(),
                run_id: None,
            }
        );
    }

    #[test]
    fn start_with_run_id_deserializes() {
        let event: AgentEvent = serde_json::from_value(
            json!({"type": "start", "thread_id": "t-1", "run_id": "42"}),
        )
        .unwrap();
        assert!(matches!(
            event,
            AgentEvent::Start { run_id: Some(ref id), .. } if id == "42"
        ));
    }

    #[test]
    fn tool_events_tolerate_missing_payload() {
        let event: AgentEvent =
            serde_json::from_value(json!({"type": "tool_end", "tool": "planner"})).unwrap();
        assert_eq!(
            event,
            AgentEvent::ToolEnd {
                tool: "planner".to_string(),
                output: serde_json::Value::Null,
            }
        );
    }

    #[test]
    fn complete_accepts_structured_result() {
        let event: AgentEvent = serde_json::from_value(
            json!({"type": "complete", "result": {"summary": "done"}}),
        )
        .unwrap();
        assert!(event.is_terminal());
        assert_eq!(event.kind(), "complete");
    }

    #[test]
    fn error_is_not_terminal() {
        assert!(!AgentEvent::error("boom").is_terminal());
        assert!(AgentEvent::SearchComplete {
            result: "x".to_string(),
            total_results: 1,
        }
        .is_terminal());
    }

    #[test]
    fn serializes_with_type_tag() {
        let value = serde_json::to_value(AgentEvent::Source {
            title: "doc1".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "source", "title": "doc1"}));
    }

    #[test]
    fn strategy_display() {
        assert_eq!(Strategy::Fast.to_string(), "fast");
        assert_eq!(Strategy::General.to_string(), "general");
    }
}
