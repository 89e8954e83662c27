//! HTTP transport for postback requests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Url};
use thiserror::Error;
use tracker_core::{AttributionError, Result, DEFAULT_TIMEOUT_SECS};

use crate::request::{AttributionRequest, AttributionResponse, Method};

/// Sends postback requests.
///
/// Implementations never fail outright: every error is carried in the
/// returned [`AttributionResponse`]. Exactly one attempt is made per call.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: AttributionRequest) -> AttributionResponse;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: AttributionRequest) -> AttributionResponse {
        (**self).send(request).await
    }
}

/// Non-2xx reply from the tracking server
#[derive(Error, Debug)]
#[error("HTTP {status}: {message}")]
pub struct StatusError {
    pub status: u16,
    pub message: String,
}

/// reqwest-backed [`Transport`]
pub struct HttpTransport {
    http: Client,
    user_agent: String,
    default_timeout: Duration,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            user_agent: Self::default_user_agent(),
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// `ClickzinTracker/<version> (<os>)`
    pub fn default_user_agent() -> String {
        format!(
            "ClickzinTracker/{} ({})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        )
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Timeout for requests that do not carry their own
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    fn parse_url(raw: &str) -> Result<Url> {
        let url = Url::parse(raw)
            .map_err(|e| AttributionError::InvalidURL(format!("{}: {}", raw, e)))?;
        match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(url),
            _ => Err(AttributionError::InvalidURL(format!(
                "{}: expected an http(s) URL with a host",
                raw
            ))),
        }
    }

    /// Default headers with caller overrides applied on top
    fn build_headers(&self, request: &AttributionRequest) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let agent = HeaderValue::from_str(&self.user_agent).map_err(|e| {
            AttributionError::InvalidParameters(format!("invalid User-Agent: {}", e))
        })?;
        headers.insert(USER_AGENT, agent);

        for (name, value) in request.headers() {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                AttributionError::InvalidParameters(format!("invalid header name {:?}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                AttributionError::InvalidParameters(format!("invalid header value: {}", e))
            })?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    async fn execute(&self, request: AttributionRequest) -> Result<Vec<u8>> {
        let mut url = Self::parse_url(request.url())?;
        request.validate_params()?;
        let mut headers = self.build_headers(&request)?;
        let timeout = request.timeout_duration().unwrap_or(self.default_timeout);

        let builder = match request.method() {
            Method::Get => {
                if !request.params().is_empty() {
                    // parse_url guarantees a base URL, so query pairs can be attached
                    let mut pairs = url.query_pairs_mut();
                    for (name, value) in request.params() {
                        pairs.append_pair(name, &value.to_query_string());
                    }
                }
                self.http.get(url.clone())
            }
            Method::Post => {
                let builder = self.http.post(url.clone());
                if request.params().is_empty() {
                    builder
                } else {
                    let body = request.json_body()?;
                    if !headers.contains_key(CONTENT_TYPE) {
                        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                    }
                    builder.body(body)
                }
            }
        };

        tracing::debug!(
            method = %request.method(),
            url = %url,
            timeout_ms = timeout.as_millis() as u64,
            "Sending postback"
        );

        let resp = builder
            .headers(headers)
            .timeout(timeout)
            .send()
            .await
            .map_err(AttributionError::network)?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(AttributionError::network)?;

        if !status.is_success() {
            return Err(AttributionError::network(StatusError {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            }));
        }

        Ok(body.to_vec())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: AttributionRequest) -> AttributionResponse {
        match self.execute(request).await {
            Ok(body) if body.is_empty() => AttributionResponse::empty(),
            Ok(body) => AttributionResponse::ok(body),
            Err(err) => {
                tracing::debug!(error = %err, "Postback failed");
                AttributionResponse::failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(HttpTransport::parse_url("https://clickzin.com/postback/ios").is_ok());
        assert!(matches!(
            HttpTransport::parse_url("not a url"),
            Err(AttributionError::InvalidURL(_))
        ));
        assert!(matches!(
            HttpTransport::parse_url("mailto:ops@clickzin.com"),
            Err(AttributionError::InvalidURL(_))
        ));
    }

    #[test]
    fn test_caller_headers_win() {
        let transport = HttpTransport::new();
        let request = AttributionRequest::get("http://localhost")
            .header("Accept", "text/plain")
            .header("X-Api-Key", "secret");

        let headers = transport.build_headers(&request).unwrap();
        assert_eq!(headers[ACCEPT], "text/plain");
        assert_eq!(headers["x-api-key"], "secret");
        assert_eq!(
            headers[USER_AGENT].to_str().unwrap(),
            HttpTransport::default_user_agent()
        );
    }

    #[test]
    fn test_invalid_header_rejected() {
        let transport = HttpTransport::new();
        let request = AttributionRequest::get("http://localhost").header("bad header", "x");
        assert!(matches!(
            transport.build_headers(&request),
            Err(AttributionError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_user_agent_format() {
        let agent = HttpTransport::default_user_agent();
        assert!(agent.starts_with("ClickzinTracker/"));
        assert!(agent.ends_with(&format!("({})", std::env::consts::OS)));
    }

    #[tokio::test]
    async fn test_invalid_url_skips_network() {
        let transport = HttpTransport::new();
        let response = transport
            .send(AttributionRequest::get("://missing-scheme").param("uid", "x"))
            .await;

        assert!(response.body.is_none());
        assert!(matches!(response.error, Some(AttributionError::InvalidURL(_))));
    }

    #[tokio::test]
    async fn test_invalid_params_skip_network() {
        let transport = HttpTransport::new();
        let response = transport
            .send(AttributionRequest::post("http://127.0.0.1:9/postback").param("v", f64::INFINITY))
            .await;

        assert!(matches!(
            response.error,
            Some(AttributionError::InvalidParameters(_))
        ));
    }
}
