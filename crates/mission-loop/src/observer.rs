use async_trait::async_trait;
use mission_client::ParseFailure;
use mission_core::AgentEvent;
use tokio::sync::mpsc;

use crate::aggregator::MissionOutcome;

/// Receives a mission's progress in arrival order.
#[async_trait]
pub trait MissionObserver: Send {
    /// Called for every event, including repeated sources.
    async fn on_event(&mut self, event: &AgentEvent);

    async fn on_diagnostic(&mut self, _failure: &ParseFailure) {}

    /// Called exactly once when the mission concludes. Not called on cancellation.
    async fn on_done(&mut self, outcome: MissionOutcome);
}

#[derive(Debug, Clone, PartialEq)]
pub enum MissionUpdate {
    Event(AgentEvent),
    Diagnostic(ParseFailure),
    Done(MissionOutcome),
}

/// Forward updates over a channel. A closed receiver drops updates silently.
#[async_trait]
impl MissionObserver for mpsc::Sender<MissionUpdate> {
    async fn on_event(&mut self, event: &AgentEvent) {
        let _ = self.send(MissionUpdate::Event(event.clone())).await;
    }

    async fn on_diagnostic(&mut self, failure: &ParseFailure) {
        let _ = self.send(MissionUpdate::Diagnostic(failure.clone())).await;
    }

    async fn on_done(&mut self, outcome: MissionOutcome) {
        let _ = self.send(MissionUpdate::Done(outcome)).await;
    }
}
