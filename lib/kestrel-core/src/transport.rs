//! Transport capability trait.
//!
//! The transport is the component that actually moves bytes over the wire.
//! The pipeline treats it as an external collaborator: it hands over a
//! fully-built [`Request`] and gets back body bytes, headers, and a status
//! code. A hyper-based implementation lives in the `kestrel` crate; tests
//! substitute stubs.

use std::future::Future;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Executes HTTP requests.
///
/// Awaiting [`Transport::execute`] is the sole suspension point of the
/// request pipeline. Implementations must tolerate concurrent invocation
/// from many in-flight requests.
pub trait Transport: Send + Sync {
    /// Execute an HTTP request and return the raw response.
    ///
    /// # Errors
    ///
    /// Returns a transport-level error (connection, TLS, timeout) if the
    /// exchange could not be completed. Such errors are surfaced to the
    /// caller unmapped; only HTTP-semantic failures go through the
    /// delegate's error hook.
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}
