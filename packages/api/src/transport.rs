//! # Transport: one HTTP exchange with the wiki API
//!
//! [`Transport`] is the seam between [`crate::WikiClient`] and the network. It
//! takes a fully described [`ApiRequest`] (method, path, query, body, optional
//! bearer token) and resolves to the decoded JSON body or a classified
//! [`ApiError`]. The production implementation is [`HttpTransport`] (`reqwest`,
//! which uses `fetch` on the web); tests substitute an in-memory fake.
//!
//! An empty 2xx body decodes to `Value::Null`, which is what `DELETE` endpoints
//! return.
//!
//! Every exchange is bounded by [`ApiConfig::request_timeout`]. Native builds
//! hand the limit to `reqwest`; `fetch` has none, so on the web the exchange
//! is raced against a `gloo-timers` sleep instead.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    /// Multipart upload with a single `file` field.
    File {
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
    pub token: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
            token: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.body = Body::Json(value);
        Ok(self)
    }

    pub fn file(mut self, file_name: &str, mime: &str, bytes: Vec<u8>) -> Self {
        self.body = Body::File {
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            bytes,
        };
        self
    }

    pub fn bearer(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}

/// Sends a request and returns the decoded JSON body.
pub trait Transport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<Value, ApiError>>;
}

/// `reqwest`-backed transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let timeout = config.request_timeout();
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(timeout);
        let client = builder
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Resolve `request`, or fail with [`ApiError::Network`] once `deadline`
/// fires first.
pub(crate) async fn with_deadline<T>(
    request: impl Future<Output = Result<T, ApiError>>,
    deadline: impl Future<Output = ()>,
    timeout: Duration,
) -> Result<T, ApiError> {
    tokio::select! {
        biased;
        result = request => result,
        () = deadline => {
            tracing::warn!(?timeout, "api request timed out");
            Err(ApiError::Network(format!(
                "no response within {} seconds",
                timeout.as_secs()
            )))
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        #[cfg(target_arch = "wasm32")]
        {
            let deadline = gloo_timers::future::sleep(self.timeout);
            with_deadline(self.exchange(request), deadline, self.timeout).await
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.exchange(request).await
        }
    }
}

impl HttpTransport {
    async fn exchange(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let url = self.url(&request.path);
        tracing::debug!(%method, %url, "api request");

        let mut builder = self.client.request(method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::File {
                file_name,
                mime,
                bytes,
            } => {
                let part = reqwest::multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|_| ApiError::invalid_field("file", "Unsupported file type"))?;
                builder.multipart(reqwest::multipart::Form::new().part("file", part))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_request_builder() {
        let req = ApiRequest::get("/search")
            .query("q", "rust wiki")
            .bearer(Some("tok".into()));
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.query, vec![("q".to_string(), "rust wiki".to_string())]);
        assert_eq!(req.token.as_deref(), Some("tok"));
        assert_eq!(req.body, Body::Empty);
    }

    #[tokio::test]
    async fn test_deadline_maps_to_network_error() {
        let timeout = Duration::from_secs(15);
        let hung = std::future::pending::<Result<Value, ApiError>>();
        let err = with_deadline(hung, std::future::ready(()), timeout)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("15 seconds"), "{err}");
    }

    #[tokio::test]
    async fn test_response_before_deadline_passes_through() {
        let answered = std::future::ready(Ok::<_, ApiError>(Value::Bool(true)));
        let result = with_deadline(answered, std::future::pending(), Duration::from_secs(1)).await;
        assert_eq!(result.unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_transport_keeps_configured_timeout() {
        let config = ApiConfig::default();
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.timeout(), config.request_timeout());
    }

    #[test]
    fn test_url_joining() {
        let config = ApiConfig {
            api_base_url: "https://wiki.test/api/".into(),
            ..ApiConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.url("/pages/1"), "https://wiki.test/api/pages/1");
        assert_eq!(transport.url("tags"), "https://wiki.test/api/tags");
    }
}
