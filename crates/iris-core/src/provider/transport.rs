//! HTTP transport seam.
//!
//! The retry policy and the driver only ever see a [`Transport`]; the real
//! network client lives behind it so everything above can be exercised with
//! scripted replies.

use super::adapter::RequestSpec;
use crate::error::{TaskError, TaskResult};
use async_trait::async_trait;
use std::time::Duration;

/// Raw result of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    /// Parsed `Retry-After` header (seconds form only)
    pub retry_after: Option<Duration>,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }
}

/// Sends one request and returns whatever the server answered.
///
/// Any HTTP status is an `Ok` reply; `Err` is reserved for exchanges that
/// produced no status at all (connect failure, timeout).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestSpec) -> TaskResult<HttpReply>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestSpec) -> TaskResult<HttpReply> {
        let mut builder = self.client.post(&request.endpoint_url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let resp = builder
            .json(&request.body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TaskError::Request {
                message: format!("Request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status().as_u16();
        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body = resp.text().await.map_err(|e| TaskError::Request {
            message: format!("Failed to read response body: {e}"),
            status_code: Some(status),
        })?;

        Ok(HttpReply {
            status,
            retry_after,
            body,
        })
    }
}

/// Parse the delta-seconds form of `Retry-After`. HTTP-date values are ignored.
pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
