//! Template for clients of JSON HTTP APIs.
//!
//! # Design
//! `JsonApiClient` is the capability set a concrete client provides: a
//! transport plus three hooks with defaults (`serializer_options`,
//! `format_url`, `process_response`). The request flows live in
//! `JsonApiClientExt`, blanket-implemented for every client, and always run
//! the same linear sequence:
//!
//! ```text
//! validate → format_url → send → process_response → decode → transform
//! ```
//!
//! `process_response` is the single place for cross-cutting response handling:
//! mapping error statuses to domain errors, inspecting headers, logging.
//!
//! `BasicJsonClient` is a ready-made implementation that resolves relative
//! paths against a base URL.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::error::{require_url, Result};
use crate::http::HttpResponse;
use crate::json;
use crate::options::SerializerOptions;
use crate::post::HttpTransportJsonExt;
use crate::transport::HttpTransport;

/// Hooks a concrete JSON API client implements or overrides.
#[async_trait]
pub trait JsonApiClient: Send + Sync {
    fn transport(&self) -> &dyn HttpTransport;

    /// Options used to encode requests and decode responses.
    fn serializer_options(&self) -> SerializerOptions {
        SerializerOptions::DEFAULT
    }

    /// Turn the URL given to a request helper into the one that is sent.
    async fn format_url(&self, url: &str, _cancel: &CancellationToken) -> Result<String> {
        Ok(url.to_string())
    }

    /// Runs on every response before it is decoded. The default only
    /// enforces a 2xx status and hands the response back unchanged.
    async fn process_response(
        &self,
        response: HttpResponse,
        _options: &SerializerOptions,
        _cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        response.ensure_success_status()?;
        Ok(response)
    }
}

/// GET/POST/DELETE flows shared by every [`JsonApiClient`].
///
/// `transform` receives the response returned by `process_response` and the
/// value decoded from its body, so callers can fold headers or the status into
/// their result.
#[async_trait]
pub trait JsonApiClientExt: JsonApiClient {
    async fn get<Resp, Ret, F>(&self, url: &str, transform: F, cancel: &CancellationToken) -> Result<Ret>
    where
        Resp: DeserializeOwned,
        F: FnOnce(&HttpResponse, Resp) -> Ret + Send,
    {
        require_url(url)?;
        let url = self.format_url(url, cancel).await?;
        let options = self.serializer_options();
        let response = self.transport().get(&url, cancel).await?;
        self.decode_response::<Resp, Ret, F>(response, &options, transform, cancel)
            .await
    }

    async fn get_json<Resp>(&self, url: &str, cancel: &CancellationToken) -> Result<Resp>
    where
        Resp: DeserializeOwned,
    {
        self.get(url, |_: &HttpResponse, value: Resp| value, cancel).await
    }

    /// POST `request` and discard the body once `process_response` accepts it.
    async fn post<Req>(&self, url: &str, request: &Req, cancel: &CancellationToken) -> Result<()>
    where
        Req: Serialize + Sync + ?Sized,
    {
        require_url(url)?;
        let options = self.serializer_options();
        let body = json::to_vec(request, &options)?;
        let url = self.format_url(url, cancel).await?;
        let response = self
            .transport()
            .post_json_bytes_for_response(&url, body, false, cancel)
            .await?;
        self.process_response(response, &options, cancel).await?;
        Ok(())
    }

    async fn post_with<Req, Resp, Ret, F>(
        &self,
        url: &str,
        request: &Req,
        transform: F,
        cancel: &CancellationToken,
    ) -> Result<Ret>
    where
        Req: Serialize + Sync + ?Sized,
        Resp: DeserializeOwned,
        F: FnOnce(&HttpResponse, Resp) -> Ret + Send,
    {
        require_url(url)?;
        let options = self.serializer_options();
        let body = json::to_vec(request, &options)?;
        let url = self.format_url(url, cancel).await?;
        let response = self
            .transport()
            .post_json_bytes_for_response(&url, body, false, cancel)
            .await?;
        self.decode_response::<Resp, Ret, F>(response, &options, transform, cancel)
            .await
    }

    async fn post_json<Req, Resp>(&self, url: &str, request: &Req, cancel: &CancellationToken) -> Result<Resp>
    where
        Req: Serialize + Sync + ?Sized,
        Resp: DeserializeOwned,
    {
        self.post_with(url, request, |_: &HttpResponse, value: Resp| value, cancel)
            .await
    }

    async fn delete<Resp, Ret, F>(&self, url: &str, transform: F, cancel: &CancellationToken) -> Result<Ret>
    where
        Resp: DeserializeOwned,
        F: FnOnce(&HttpResponse, Resp) -> Ret + Send,
    {
        require_url(url)?;
        let url = self.format_url(url, cancel).await?;
        let options = self.serializer_options();
        let response = self.transport().delete(&url, cancel).await?;
        self.decode_response::<Resp, Ret, F>(response, &options, transform, cancel)
            .await
    }

    async fn delete_json<Resp>(&self, url: &str, cancel: &CancellationToken) -> Result<Resp>
    where
        Resp: DeserializeOwned,
    {
        self.delete(url, |_: &HttpResponse, value: Resp| value, cancel).await
    }

    /// `process_response`, then decode, then `transform`.
    async fn decode_response<Resp, Ret, F>(
        &self,
        response: HttpResponse,
        options: &SerializerOptions,
        transform: F,
        cancel: &CancellationToken,
    ) -> Result<Ret>
    where
        Resp: DeserializeOwned,
        F: FnOnce(&HttpResponse, Resp) -> Ret + Send,
    {
        let response = self.process_response(response, options, cancel).await?;
        let value: Resp = response.to_object(options)?;
        Ok(transform(&response, value))
    }
}

impl<C> JsonApiClientExt for C where C: JsonApiClient + ?Sized {}

/// A `JsonApiClient` that joins relative paths onto a base URL.
#[derive(Clone)]
pub struct BasicJsonClient {
    transport: Arc<dyn HttpTransport>,
    base_url: Option<String>,
    options: SerializerOptions,
}

impl BasicJsonClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: None,
            options: SerializerOptions::DEFAULT,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    pub fn with_serializer_options(mut self, options: SerializerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}

impl std::fmt::Debug for BasicJsonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicJsonClient")
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl JsonApiClient for BasicJsonClient {
    fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    fn serializer_options(&self) -> SerializerOptions {
        self.options
    }

    #[instrument(name = "format_url", skip(self, _cancel))]
    async fn format_url(&self, url: &str, _cancel: &CancellationToken) -> Result<String> {
        let formatted = match &self.base_url {
            Some(base) if !is_absolute(url) => format!("{base}/{}", url.trim_start_matches('/')),
            _ => url.to_string(),
        };
        debug!(%formatted, "resolved url");
        Ok(formatted)
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::http::HttpRequest;

    struct Unreachable;

    #[async_trait]
    impl HttpTransport for Unreachable {
        async fn send(&self, request: HttpRequest, _cancel: &CancellationToken) -> Result<HttpResponse> {
            panic!("unexpected request to {}", request.url);
        }
    }

    fn client() -> BasicJsonClient {
        BasicJsonClient::new(Arc::new(Unreachable)).with_base_url("http://localhost:3000/")
    }

    #[tokio::test]
    async fn relative_paths_join_base_url() {
        let cancel = CancellationToken::new();
        let c = client();
        assert_eq!(c.base_url(), Some("http://localhost:3000"));
        assert_eq!(
            c.format_url("/items/1", &cancel).await.unwrap(),
            "http://localhost:3000/items/1"
        );
        assert_eq!(
            c.format_url("items", &cancel).await.unwrap(),
            "http://localhost:3000/items"
        );
    }

    #[tokio::test]
    async fn absolute_urls_pass_through() {
        let cancel = CancellationToken::new();
        assert_eq!(
            client().format_url("https://other.example/x", &cancel).await.unwrap(),
            "https://other.example/x"
        );
        let bare = BasicJsonClient::new(Arc::new(Unreachable));
        assert_eq!(bare.format_url("/x", &cancel).await.unwrap(), "/x");
    }

    #[tokio::test]
    async fn blank_url_rejected_without_io() {
        let cancel = CancellationToken::new();
        let err = client().get_json::<serde_json::Value>(" ", &cancel).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument { name: "url", .. }));
        let err = client().post("", &serde_json::json!({"a": 1}), &cancel).await.unwrap_err();
        assert!(err.is_invalid_argument());
        let err = client()
            .post_json::<_, serde_json::Value>("/x", &Option::<u8>::None, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument { name: "request", .. }));
    }

    #[test]
    fn serializer_options_override() {
        let options = SerializerOptions::DEFAULT.with_ignore_null_values(false);
        let c = client().with_serializer_options(options);
        assert_eq!(c.serializer_options(), options);
        assert_eq!(client().serializer_options(), SerializerOptions::DEFAULT);
    }
}
