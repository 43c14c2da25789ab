//! Status verification and typed decoding of an `HttpResponse`.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{ApiError, Result};
use crate::http::HttpResponse;
use crate::json;
use crate::options::SerializerOptions;

impl HttpResponse {
    /// Fail with `ApiError::Status` unless the status is in `200..=299`.
    pub fn ensure_success_status(&self) -> Result<()> {
        if self.is_success() {
            return Ok(());
        }
        warn!(status = self.status, body_length = self.body.len(), "non-success status");
        Err(ApiError::Status {
            status: self.status,
            body: self.text(),
        })
    }

    /// Decode the body into `T` under `options`.
    ///
    /// Does not look at the status code; callers verify it first.
    pub fn to_object<T>(&self, options: &SerializerOptions) -> Result<T>
    where
        T: DeserializeOwned,
    {
        json::from_slice(&self.body, options)
    }

    /// [`HttpResponse::to_object`] with [`SerializerOptions::DEFAULT`].
    pub fn json<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.to_object(&SerializerOptions::DEFAULT)
    }
}
