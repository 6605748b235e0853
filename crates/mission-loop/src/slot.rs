use std::sync::Arc;

use mission_client::{MissionClient, RoutePlan};
use mission_core::Session;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::aggregator::{MissionOutcome, SessionAggregator, SharedSession};
use crate::observer::MissionObserver;

/// Caller-side view of a running mission.
#[derive(Clone)]
pub struct MissionHandle {
    pub mission_id: String,
    pub plan: RoutePlan,
    cancel_token: CancellationToken,
    outcome: watch::Receiver<Option<MissionOutcome>>,
}

impl MissionHandle {
    /// Abandon the mission. Safe to call any number of times.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Token for layering timeouts or signal handling outside the core.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Wait for the mission to conclude.
    pub async fn finished(&self) -> MissionOutcome {
        let mut receiver = self.outcome.clone();
        let outcome = match receiver.wait_for(Option::is_some).await {
            Ok(value) => (*value).unwrap_or(MissionOutcome::Cancelled),
            // Driver task went away without reporting.
            Err(_) => MissionOutcome::Cancelled,
        };
        outcome
    }
}

struct RunningMission {
    session: SharedSession,
    cancel_token: CancellationToken,
    task: Option<JoinHandle<MissionOutcome>>,
}

impl RunningMission {
    async fn shutdown(&mut self) {
        self.cancel_token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::warn!("Mission task ended abnormally: {}", e);
            }
        }
    }
}

/// One mission at a time: starting a new mission tears down the previous one first.
pub struct SessionSlot {
    client: Arc<MissionClient>,
    current: Mutex<Option<RunningMission>>,
}

impl SessionSlot {
    pub fn new(client: Arc<MissionClient>) -> Self {
        Self {
            client,
            current: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &MissionClient {
        &self.client
    }

    /// Route the task and start it.
    pub async fn start(&self, task: &str, observer: Box<dyn MissionObserver>) -> MissionHandle {
        let plan = self.client.route(task);
        self.start_with_plan(plan, task, observer).await
    }

    pub async fn start_with_plan(
        &self,
        plan: RoutePlan,
        task: &str,
        mut observer: Box<dyn MissionObserver>,
    ) -> MissionHandle {
        let mut current = self.current.lock().await;

        if let Some(mut previous) = current.take() {
            let previous_id = previous.session.read().await.id.clone();
            log::info!("[{}] Superseded by a new mission, cancelling", previous_id);
            previous.shutdown().await;
        }

        let session = Arc::new(RwLock::new(Session::new(task, plan.strategy)));
        let mission_id = session.read().await.id.clone();
        log::info!(
            "[{}] Routing to {} path at {}",
            mission_id,
            plan.strategy,
            plan.endpoint
        );

        let cancel_token = CancellationToken::new();
        let (outcome_tx, outcome_rx) = watch::channel(None);
        let stream = self.client.execute(&plan, task);
        let aggregator = SessionAggregator::new(Arc::clone(&session), cancel_token.clone());

        let driver = tokio::spawn(async move {
            let outcome = aggregator.run(stream, observer.as_mut()).await;
            let _ = outcome_tx.send(Some(outcome));
            outcome
        });

        *current = Some(RunningMission {
            session,
            cancel_token: cancel_token.clone(),
            task: Some(driver),
        });

        MissionHandle {
            mission_id,
            plan,
            cancel_token,
            outcome: outcome_rx,
        }
    }

    /// Cancel the current mission and wait for its connection to close. Idempotent.
    pub async fn cancel(&self) {
        if let Some(running) = self.current.lock().await.as_mut() {
            running.shutdown().await;
        }
    }

    /// Copy of the current session state, if a mission was ever started.
    pub async fn snapshot(&self) -> Option<Session> {
        let current = self.current.lock().await;
        match current.as_ref() {
            Some(running) => Some(running.session.read().await.clone()),
            None => None,
        }
    }

    pub async fn is_running(&self) -> bool {
        match self.snapshot().await {
            Some(session) => session.active,
            None => false,
        }
    }
}
