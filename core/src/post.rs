//! JSON POST helpers available on every [`HttpTransport`].
//!
//! # Design
//! Each result shape has exactly one function taking a [`PostJsonOptions`]
//! value; defaults live in that struct instead of in overloads. All shapes go
//! through [`HttpTransportJsonExt::post_json_bytes_for_response`], so the
//! content-type selection and URL validation happen in one place.
//!
//! | Function | Status checked | Body decoded |
//! |----------|----------------|--------------|
//! | `post_json_for_response` | no | no, response handed to the caller |
//! | `post_json_without_response` | yes | no |
//! | `post_json` | yes | yes |

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{require_url, Result};
use crate::http::{json_content_type, HttpResponse};
use crate::json;
use crate::options::PostJsonOptions;
use crate::transport::HttpTransport;

#[async_trait]
pub trait HttpTransportJsonExt: HttpTransport {
    /// POST an already encoded JSON body and return the raw response.
    async fn post_json_bytes_for_response(
        &self,
        url: &str,
        body: Vec<u8>,
        include_charset: bool,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        require_url(url)?;
        debug!(url, body_length = body.len(), include_charset, "posting json");
        self.post(url, json_content_type(include_charset), body, cancel)
            .await
    }

    /// Serialize `request` and POST it, returning the raw response unchecked.
    async fn post_json_for_response<Req>(
        &self,
        url: &str,
        request: &Req,
        options: &PostJsonOptions,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse>
    where
        Req: Serialize + Sync + ?Sized,
    {
        // A blank URL is reported before the payload is encoded and null-checked.
        require_url(url)?;
        let body = json::to_vec(request, &options.serializer)?;
        self.post_json_bytes_for_response(url, body, options.include_charset, cancel)
            .await
    }

    /// POST `request` and only verify that the status is a success code.
    async fn post_json_without_response<Req>(
        &self,
        url: &str,
        request: &Req,
        options: &PostJsonOptions,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        Req: Serialize + Sync + ?Sized,
    {
        let response = self
            .post_json_for_response(url, request, options, cancel)
            .await?;
        response.ensure_success_status()
    }

    /// POST `request`, verify the status, then decode the body as `Resp`
    /// with the same serializer options.
    async fn post_json<Req, Resp>(
        &self,
        url: &str,
        request: &Req,
        options: &PostJsonOptions,
        cancel: &CancellationToken,
    ) -> Result<Resp>
    where
        Req: Serialize + Sync + ?Sized,
        Resp: DeserializeOwned,
    {
        let response = self
            .post_json_for_response(url, request, options, cancel)
            .await?;
        response.ensure_success_status()?;
        response.to_object(&options.serializer)
    }
}

impl<T> HttpTransportJsonExt for T where T: HttpTransport + ?Sized {}
