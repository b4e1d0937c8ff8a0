//! Customization delegate.
//!
//! A [`Delegate`] bundles the pluggable policy of a client: extra headers
//! per endpoint, the body codec, the transport to use, a request decoration
//! hook, and the mapping from failed responses to errors. It is supplied
//! once at client construction and shared by every in-flight request, so
//! implementations must be stateless or internally synchronized.
//!
//! Every method except the transport accessor has a default, so a minimal
//! delegate is just:
//!
//! ```ignore
//! struct MyDelegate {
//!     transport: HyperTransport,
//! }
//!
//! impl Delegate for MyDelegate {
//!     type Transport = HyperTransport;
//!
//!     fn transport(&self) -> &Self::Transport {
//!         &self.transport
//!     }
//! }
//! ```

use std::collections::HashMap;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{Endpoint, Error, Request, Result, Transport};

/// Pluggable per-client customization policy.
pub trait Delegate: Send + Sync + 'static {
    /// The transport used to execute requests.
    type Transport: Transport;

    /// The transport instance for this delegate.
    fn transport(&self) -> &Self::Transport;

    /// Extra headers for an endpoint, merged into the built request after
    /// the pipeline's own headers (same-name entries win).
    ///
    /// Default: no extra headers.
    fn headers<R>(&self, _endpoint: &Endpoint<R>) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Convert a non-success response into the terminal error for the
    /// request.
    ///
    /// Default: wraps the status code (and body, when non-empty) in
    /// [`Error::Http`].
    fn error_for(&self, _url: &Url, status: StatusCode, body: &Bytes) -> Error {
        let message = status.canonical_reason().unwrap_or("unexpected status");
        if body.is_empty() {
            Error::http(status.as_u16(), message)
        } else {
            Error::http_with_body(status.as_u16(), message, body.clone())
        }
    }

    /// Rewrite the built request before it reaches the transport (auth
    /// header injection, tracing propagation, ...).
    ///
    /// Default: identity.
    fn decorate(&self, request: Request) -> Request {
        request
    }

    /// Encode a structured request body to bytes.
    ///
    /// Default: [`to_json`](crate::to_json).
    fn encode_body(&self, body: &serde_json::Value) -> Result<Bytes> {
        crate::to_json(body)
    }

    /// Decode response body bytes into the expected type.
    ///
    /// Default: [`from_json`](crate::from_json) with path-aware errors.
    fn decode_body<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        crate::from_json(bytes)
    }
}
