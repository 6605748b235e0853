use mission_core::AgentEvent;
use thiserror::Error;

/// A frame payload that is not a known event shape. Never fatal to the stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unparseable event payload ({reason}): {payload}")]
pub struct ParseFailure {
    pub payload: String,
    pub reason: String,
}

pub fn parse_event(payload: &str) -> Result<AgentEvent, ParseFailure> {
    serde_json::from_str::<AgentEvent>(payload.trim()).map_err(|e| ParseFailure {
        payload: payload.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_each_event_kind() {
        let cases = [
            (r#"{"type":"start","thread_id":"t"}"#, "start"),
            (r#"{"type":"tool_start","tool":"web","input":"q"}"#, "tool_start"),
            (r#"{"type":"tool_end","tool":"web","output":"r"}"#, "tool_end"),
            (r#"{"type":"source","title":"doc1"}"#, "source"),
            (r#"{"type":"complete","result":"done"}"#, "complete"),
            (
                r#"{"type":"search_complete","result":"a","total_results":3}"#,
                "search_complete",
            ),
            (r#"{"type":"error","message":"boom"}"#, "error"),
        ];
        for (payload, kind) in cases {
            let event = parse_event(payload).unwrap_or_else(|e| panic!("{payload}: {e}"));
            assert_eq!(event.kind(), kind);
        }
    }

    #[test]
    fn tool_input_keeps_structure() {
        let event = parse_event(r#"{"type":"tool_start","tool":"search","input":{"q":"x"}}"#)
            .expect("event");
        assert_eq!(
            event,
            AgentEvent::ToolStart {
                tool: "search".to_string(),
                input: json!({"q": "x"}),
            }
        );
    }

    #[test]
    fn unknown_type_is_a_parse_failure() {
        let failure = parse_event(r#"{"type":"heartbeat"}"#).unwrap_err();
        assert_eq!(failure.payload, r#"{"type":"heartbeat"}"#);
        assert!(!failure.reason.is_empty());
    }

    #[test]
    fn malformed_json_is_a_parse_failure() {
        let failure = parse_event("{not json").unwrap_err();
        assert_eq!(failure.payload, "{not json");
    }

    #[test]
    fn missing_required_field_is_a_parse_failure() {
        assert!(parse_event(r#"{"type":"source"}"#).is_err());
        assert!(parse_event(r#"{"type":"search_complete","result":"a"}"#).is_err());
    }
}
