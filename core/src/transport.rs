//! HTTP transport abstraction and its reqwest implementation.
//!
//! # Design
//! `HttpTransport` has one required method, `send`, which performs a single
//! round-trip and returns the response as data. Transports never turn a
//! status code into an error and never retry. Cancellation is delegated here:
//! the token is threaded through every helper and only the transport acts on it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, CONTENT_TYPE};

/// Something that can execute an `HttpRequest`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest, cancel: &CancellationToken) -> Result<HttpResponse>;

    async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<HttpResponse> {
        self.send(HttpRequest::new(HttpMethod::Get, url), cancel).await
    }

    async fn delete(&self, url: &str, cancel: &CancellationToken) -> Result<HttpResponse> {
        self.send(HttpRequest::new(HttpMethod::Delete, url), cancel).await
    }

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        let request = HttpRequest::new(HttpMethod::Post, url)
            .with_header(CONTENT_TYPE, content_type)
            .with_body(body);
        self.send(request, cancel).await
    }
}

#[async_trait]
impl<T> HttpTransport for Arc<T>
where
    T: HttpTransport + ?Sized,
{
    async fn send(&self, request: HttpRequest, cancel: &CancellationToken) -> Result<HttpResponse> {
        (**self).send(request, cancel).await
    }
}

#[async_trait]
impl<'a, T> HttpTransport for &'a T
where
    T: HttpTransport + ?Sized,
{
    async fn send(&self, request: HttpRequest, cancel: &CancellationToken) -> Result<HttpResponse> {
        (**self).send(request, cancel).await
    }
}

/// Settings used when `ReqwestTransport` builds its own `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("json-api-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// `HttpTransport` backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(ApiError::transport)?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(ApiError::transport)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(ApiError::transport)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(
        name = "http_send",
        skip(self, request, cancel),
        fields(method = %request.method, url = %request.url)
    )]
    async fn send(&self, request: HttpRequest, cancel: &CancellationToken) -> Result<HttpResponse> {
        debug!(
            body_length = request.body.as_ref().map_or(0, Vec::len),
            "sending request"
        );
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ApiError::Cancelled),
            result = self.execute(request) => result?,
        };
        debug!(
            status = response.status,
            body_length = response.body.len(),
            "response received"
        );
        Ok(response)
    }
}
