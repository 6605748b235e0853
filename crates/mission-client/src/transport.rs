use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use mission_core::Config;
use reqwest::{header, Client, Response, StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}")]
    HttpStatus { status: u16, body: String },

    #[error("Response has no body")]
    NoBody,

    #[error("Invalid response JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Raw response body chunks in arrival order. Dropping the stream closes the connection.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a streaming POST. Fails before yielding anything if the status is not 2xx.
    async fn open(&self, endpoint: &str, body: &serde_json::Value) -> Result<FragmentStream>;

    /// Issue a single-shot POST and decode the JSON response.
    async fn request(&self, endpoint: &str, body: &serde_json::Value)
        -> Result<serde_json::Value>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        // Proxy settings come from Config only, which already folds in HTTPS_PROXY.
        let builder = if config.https_proxy.is_empty() {
            Client::builder().no_proxy()
        } else {
            Client::builder().proxy(reqwest::Proxy::https(&config.https_proxy)?)
        };
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn post(&self, endpoint: &str, body: &serde_json::Value, accept: &str) -> Result<Response> {
        log::debug!("POST {}", endpoint);
        let response = self
            .client
            .post(endpoint)
            .header(header::ACCEPT, accept)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("POST {} failed with HTTP {}", endpoint, status);
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(TransportError::NoBody);
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, endpoint: &str, body: &serde_json::Value) -> Result<FragmentStream> {
        let response = self.post(endpoint, body, "text/event-stream").await?;
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::Network));
        Ok(Box::pin(stream))
    }

    async fn request(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let response = self.post(endpoint, body, "application/json").await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(TransportError::NoBody);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}
