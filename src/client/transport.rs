//! HTTP transport with retry policy and optional REST debug logging

use std::borrow::Cow;

use reqwest::{header::CONTENT_TYPE, Client as HttpClient, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{
    config::{DebugConfig, RequestConfig, RetryPolicy, REST_LOG_TARGET},
    error::{is_retryable_transport, ClientError, Result},
};

/// Operation name of the credential exchange; its bodies never reach the REST log
pub(crate) const AUTH_OP: &str = "auth";

/// Owns the reqwest client and the retry policy applied to every request
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: HttpClient,
    retry: RetryPolicy,
    log_rest: bool,
}

/// Status and body text of a completed round trip
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl Transport {
    pub fn new(request: &RequestConfig, debug: &DebugConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(request.timeout)
            .build()
            .map_err(|e| ClientError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, retry: request.retry, log_rest: debug.rest })
    }

    /// Request builder with the JSON content type every PocketBase call carries
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
    }

    /// Send `request`, retrying failures that happen before a response arrives.
    /// Any response, whatever its status, ends the loop.
    pub async fn execute(&self, op: &'static str, request: RequestBuilder) -> Result<RawResponse> {
        let request = request.build().map_err(|e| ClientError::transport(op, e))?;
        let mut attempt = 0;

        loop {
            let Some(current) = request.try_clone() else {
                return self.send(op, request).await.map_err(|e| ClientError::transport(op, e));
            };

            match self.send(op, current).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retry.count && is_retryable_transport(&e) => {
                    attempt += 1;
                    let wait = self.retry.backoff(attempt);
                    warn!(op, attempt, wait = ?wait, error = %e, "Retrying request");
                    sleep(wait).await;
                },
                Err(e) => return Err(ClientError::transport(op, e)),
            }
        }
    }

    async fn send(
        &self,
        op: &'static str,
        request: reqwest::Request,
    ) -> std::result::Result<RawResponse, reqwest::Error> {
        if self.log_rest {
            let body = request
                .body()
                .and_then(|b| b.as_bytes())
                .map(String::from_utf8_lossy)
                .unwrap_or_default();
            debug!(
                target: REST_LOG_TARGET,
                op,
                method = %request.method(),
                url = %request.url(),
                body = %loggable_body(op, body),
                "Request"
            );
        }

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if self.log_rest {
            debug!(
                target: REST_LOG_TARGET,
                op,
                status = status.as_u16(),
                body = %loggable_body(op, Cow::Borrowed(&body)),
                "Response"
            );
        }

        Ok(RawResponse { status, body })
    }
}

impl RawResponse {
    /// Body text of a successful response, or the invalid-response error for status >= 400
    pub fn error_for_status(self, op: &'static str) -> Result<String> {
        if self.status.as_u16() >= 400 {
            Err(ClientError::invalid_response(op, self.status.as_u16(), self.body))
        } else {
            Ok(self.body)
        }
    }

    /// Classify the status, then decode the body
    pub fn json<T>(self, op: &'static str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.error_for_status(op)?;
        serde_json::from_str(&body).map_err(|e| ClientError::decode(op, e))
    }
}

/// Body text for the REST log; credentials and issued tokens are replaced
fn loggable_body<'a>(op: &str, body: Cow<'a, str>) -> Cow<'a, str> {
    if op == AUTH_OP && !body.is_empty() {
        Cow::Borrowed("<redacted>")
    } else {
        body
    }
}

/// Append percent-encoded path segments to `base`, keeping any path prefix it has
pub(crate) fn endpoint_url(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
