//! JSON request/response helpers over an HTTP transport.
//!
//! # Overview
//! Serializes request values to JSON, POSTs them through an [`HttpTransport`],
//! checks the status and decodes JSON replies into typed values. On top of
//! that, [`JsonApiClient`] gives API client implementations a fixed
//! GET/POST/DELETE flow with hooks for URL formatting, response processing
//! and serializer options.
//!
//! # Design
//! - Transports only move bytes; status checks and decoding happen here.
//! - One function per result shape, optional parameters in [`PostJsonOptions`].
//! - [`SerializerOptions::DEFAULT`] (camelCase, nulls omitted) is a `const`
//!   passed explicitly, never mutated.
//! - Cancellation is a `CancellationToken` handed to the transport.
//! - Every failure is an [`ApiError`]; nothing is retried or swallowed.

pub mod client;
pub mod error;
pub mod http;
pub mod json;
pub mod options;
pub mod post;
pub mod response;
pub mod transport;

pub use client::{BasicJsonClient, JsonApiClient, JsonApiClientExt};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{NamingPolicy, PostJsonOptions, SerializerOptions};
pub use post::HttpTransportJsonExt;
pub use transport::{HttpTransport, ReqwestTransport, TransportConfig};

pub use tokio_util::sync::CancellationToken;
