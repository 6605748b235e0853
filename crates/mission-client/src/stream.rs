//! The two execution strategies, each producing a [`MissionStream`].
//!
//! Transport and protocol failures are folded into `AgentEvent::Error` here so
//! consumers only ever deal with the event vocabulary.

use std::pin::Pin;
use std::sync::Arc;

use async_stream::stream;
use futures::{Stream, StreamExt};
use mission_core::AgentEvent;
use serde::Deserialize;

use crate::frame::{Frame, FrameDecoder};
use crate::parser::{parse_event, ParseFailure};
use crate::transport::Transport;

pub const DIRECT_SEARCH_THREAD_ID: &str = "direct-search";

/// One item delivered to the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub enum MissionItem {
    Event(AgentEvent),
    /// A frame that could not be parsed; reported, never applied to state.
    Diagnostic(ParseFailure),
}

/// Ends on sentinel, connection close, or after a synthesized failure.
pub type MissionStream = Pin<Box<dyn Stream<Item = MissionItem> + Send>>;

/// General path: stream frames from the agent endpoint and forward events unmodified.
pub fn agent_stream(
    transport: Arc<dyn Transport>,
    endpoint: String,
    body: serde_json::Value,
) -> MissionStream {
    Box::pin(stream! {
        let mut fragments = match transport.open(&endpoint, &body).await {
            Ok(fragments) => fragments,
            Err(e) => {
                log::warn!("[{}] Stream connection failed: {}", endpoint, e);
                yield MissionItem::Event(AgentEvent::error(format!("Stream connection failed: {e}")));
                return;
            }
        };

        let mut decoder = FrameDecoder::new();
        loop {
            let (frames, closed) = match fragments.next().await {
                Some(Ok(chunk)) => (decoder.feed(&chunk), false),
                Some(Err(e)) => {
                    log::warn!("[{}] Stream interrupted: {}", endpoint, e);
                    yield MissionItem::Event(AgentEvent::error(e.to_string()));
                    return;
                }
                None => (decoder.finish(), true),
            };

            for frame in frames {
                match frame {
                    Frame::Data(payload) => match parse_event(&payload) {
                        Ok(event) => yield MissionItem::Event(event),
                        Err(failure) => {
                            log::warn!("[{}] {}", endpoint, failure);
                            yield MissionItem::Diagnostic(failure);
                        }
                    },
                    Frame::Done => {
                        log::debug!("[{}] Received end-of-stream sentinel", endpoint);
                        return;
                    }
                }
            }

            if closed {
                log::debug!("[{}] Connection closed by server", endpoint);
                return;
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    sources: Option<Vec<SearchSource>>,
    #[serde(default)]
    total_results: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SearchSource {
    #[serde(default)]
    title: Option<String>,
}

fn search_events(response: SearchResponse) -> Vec<AgentEvent> {
    if response.status != "success" {
        let message = response
            .answer
            .filter(|answer| !answer.is_empty())
            .unwrap_or_else(|| "Search failed".to_string());
        return vec![AgentEvent::error(message)];
    }

    let mut events: Vec<AgentEvent> = response
        .sources
        .unwrap_or_default()
        .into_iter()
        .filter_map(|source| source.title)
        .map(|title| AgentEvent::Source { title })
        .collect();

    events.push(AgentEvent::SearchComplete {
        result: response.answer.unwrap_or_default(),
        total_results: response.total_results.filter(|n| *n > 0).unwrap_or(1),
    });
    events
}

/// Fast path: one search request, synthesized as `start → source* → search_complete`.
pub fn search_stream(
    transport: Arc<dyn Transport>,
    endpoint: String,
    body: serde_json::Value,
) -> MissionStream {
    Box::pin(stream! {
        yield MissionItem::Event(AgentEvent::Start {
            thread_id: DIRECT_SEARCH_THREAD_ID.to_string(),
            run_id: None,
        });

        let value = match transport.request(&endpoint, &body).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("[{}] Search failed: {}", endpoint, e);
                yield MissionItem::Event(AgentEvent::error(format!("Search failed: {e}")));
                return;
            }
        };

        let events = match serde_json::from_value::<SearchResponse>(value) {
            Ok(response) => search_events(response),
            Err(e) => vec![AgentEvent::error(format!("Search failed: invalid response: {e}"))],
        };
        for event in events {
            yield MissionItem::Event(event);
        }
    })
}
