//! Injectable HTTP transport for the push protocol.

use async_trait::async_trait;
use reqwest::header;
use reqwest::StatusCode;
use thiserror::Error;

/// Path of the Loki line-protocol ingestion endpoint, appended to the
/// configured base URL.
pub const LOKI_PUSH_PATH: &str = "/loki/api/v1/push";

/// A fully prepared push request: URL, authorization header value, and the
/// serialized JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRequest {
    pub url: String,
    pub authorization: String,
    pub body: String,
}

impl PushRequest {
    /// The secret is inserted verbatim after `Basic `; no base64 transform
    /// happens at this layer.
    pub fn new(base_url: &str, secret: &str, body: String) -> Self {
        PushRequest {
            url: format!("{}{}", base_url.trim_end_matches('/'), LOKI_PUSH_PATH),
            authorization: format!("Basic {secret}"),
            body,
        }
    }
}

#[derive(Debug, Error)]
pub enum ShippingError {
    #[error("failed to prepare push payload: {0}")]
    Payload(String),
    #[error("failed to deliver push request ({0:?}): {1}")]
    Destination(Option<StatusCode>, String),
}

/// The injectable fetch-like capability used by `flush`.
///
/// The logger issues exactly one `send` per non-empty flush and imposes no
/// timeout or retry of its own; both are the transport's business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: PushRequest) -> Result<(), ShippingError>;
}

/// Default transport over a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    #[must_use]
    pub fn new() -> Self {
        HttpTransport {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: PushRequest) -> Result<(), ShippingError> {
        let response = self
            .client
            .post(&request.url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, request.authorization.as_str())
            .body(request.body)
            .send()
            .await
            .map_err(|e| ShippingError::Destination(e.status(), e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ShippingError::Destination(Some(status), body))
    }
}
