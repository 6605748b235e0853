use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use mission_client::{MissionItem, MissionStream};
use mission_core::{Applied, Session};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::observer::MissionObserver;

/// Session state shared with external readers. Only the aggregator writes it.
pub type SharedSession = Arc<RwLock<Session>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionOutcome {
    /// A terminal event arrived.
    Completed,
    /// Sentinel or connection close without a terminal event.
    Ended,
    Cancelled,
}

pub struct SessionAggregator {
    session: SharedSession,
    cancel_token: CancellationToken,
}

impl SessionAggregator {
    pub fn new(session: SharedSession, cancel_token: CancellationToken) -> Self {
        Self {
            session,
            cancel_token,
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Drive one mission's stream to its end, folding events into the session.
    pub async fn run(
        &self,
        mut stream: MissionStream,
        observer: &mut dyn MissionObserver,
    ) -> MissionOutcome {
        let mission_id = self.session.read().await.id.clone();
        log::info!("[{}] Mission started", mission_id);
        let mut event_count = 0usize;

        loop {
            let item = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => None,
                item = stream.next() => Some(item),
            };

            let Some(item) = item else {
                drop(stream);
                self.session.write().await.finish();
                log::info!(
                    "[{}] Mission cancelled after {} events",
                    mission_id,
                    event_count
                );
                return MissionOutcome::Cancelled;
            };

            match item {
                None => {
                    drop(stream);
                    self.session.write().await.finish();
                    log::info!(
                        "[{}] Stream ended without a terminal event after {} events",
                        mission_id,
                        event_count
                    );
                    return self.conclude(observer, MissionOutcome::Ended).await;
                }
                Some(MissionItem::Diagnostic(failure)) => {
                    self.deliver(observer.on_diagnostic(&failure)).await;
                }
                Some(MissionItem::Event(event)) => {
                    event_count += 1;
                    let applied = self.session.write().await.apply(&event);
                    log::debug!("[{}] {} -> {:?}", mission_id, event.kind(), applied);

                    self.deliver(observer.on_event(&event)).await;

                    if applied == Applied::Finished {
                        drop(stream);
                        log::info!(
                            "[{}] Mission completed after {} events",
                            mission_id,
                            event_count
                        );
                        return self.conclude(observer, MissionOutcome::Completed).await;
                    }
                }
            }
        }
    }

    async fn conclude(
        &self,
        observer: &mut dyn MissionObserver,
        outcome: MissionOutcome,
    ) -> MissionOutcome {
        if self.deliver(observer.on_done(outcome)).await {
            outcome
        } else {
            MissionOutcome::Cancelled
        }
    }

    /// Await an observer call, abandoning it once the mission is cancelled.
    /// Returns false if the call did not complete.
    async fn deliver<F>(&self, notification: F) -> bool
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => false,
            _ = notification => true,
        }
    }
}
