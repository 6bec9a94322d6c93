use crate::utils::error::{EnhancerError, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// Status reported when the transport fails before any response arrives.
pub const DEFAULT_UPSTREAM_STATUS: u16 = 400;

/// Thin JSON client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, timeout_ms: Option<u64>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout: timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.with_timeout(self.client.get(self.url(path)))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.with_timeout(self.client.post(self.url(path)))
    }

    fn with_timeout(&self, request: RequestBuilder) -> RequestBuilder {
        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    /// Sends the request and decodes a JSON body.
    ///
    /// A non-2xx response becomes `Upstream` with the response status and the
    /// provider's own error message when the body carries one. A transport
    /// failure becomes `Upstream` with [`DEFAULT_UPSTREAM_STATUS`].
    pub async fn send_json(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await.map_err(|e| EnhancerError::Upstream {
            status: DEFAULT_UPSTREAM_STATUS,
            message: e.to_string(),
        })?;

        let status = response.status();
        tracing::debug!("Upstream {} responded with {}", response.url(), status);

        if !status.is_success() {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            let message = upstream_message(&body)
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
            return Err(EnhancerError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| EnhancerError::malformed(format!("Response is not valid JSON: {}", e)))
    }
}

/// Pulls a human-readable message out of a provider error body.
///
/// Understands `{"error": {"message": ..}}` as well as `{"error": ".."}`.
pub fn upstream_message(body: &Value) -> Option<String> {
    match body.get("error") {
        Some(Value::Object(error)) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        Some(Value::String(message)) => Some(message.clone()),
        _ => body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}
