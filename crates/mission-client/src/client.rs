use std::sync::Arc;

use mission_core::{Config, Strategy};
use serde::Deserialize;

use crate::router::{ModeRouter, RoutePlan};
use crate::stream::{agent_stream, search_stream, MissionStream};
use crate::transport::{HttpTransport, Result, Transport, TransportError};

/// Acknowledgement of a background run started without streaming.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunTicket {
    pub status: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub run_id: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub struct MissionClient {
    transport: Arc<dyn Transport>,
    router: ModeRouter,
    run_endpoint: String,
    user_id: Option<String>,
}

impl MissionClient {
    pub fn new(config: &Config) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            router: ModeRouter::from_config(config),
            run_endpoint: config.run_url(),
            user_id: config.user_id.clone(),
        }
    }

    pub fn router(&self) -> &ModeRouter {
        &self.router
    }

    /// Pick a strategy for the task. No network call happens here.
    pub fn route(&self, task: &str) -> RoutePlan {
        self.router.route(task)
    }

    /// `{task, user_id?}` as sent to every endpoint.
    pub fn request_body(&self, task: &str) -> serde_json::Value {
        let mut body = serde_json::json!({ "task": task });
        if let Some(user_id) = &self.user_id {
            body["user_id"] = serde_json::Value::String(user_id.clone());
        }
        body
    }

    /// Run a planned strategy. The request is issued when the stream is first polled.
    pub fn execute(&self, plan: &RoutePlan, task: &str) -> MissionStream {
        let body = self.request_body(task);
        let transport = Arc::clone(&self.transport);
        match plan.strategy {
            Strategy::Fast => search_stream(transport, plan.endpoint.clone(), body),
            Strategy::General => agent_stream(transport, plan.endpoint.clone(), body),
        }
    }

    /// Route and execute in one step.
    pub fn run(&self, task: &str) -> (RoutePlan, MissionStream) {
        let plan = self.route(task);
        let stream = self.execute(&plan, task);
        (plan, stream)
    }

    /// Start a background run without streaming its progress.
    pub async fn trigger_run(&self, task: &str) -> Result<RunTicket> {
        let value = self
            .transport
            .request(&self.run_endpoint, &self.request_body(task))
            .await?;
        serde_json::from_value(value).map_err(TransportError::Decode)
    }
}
