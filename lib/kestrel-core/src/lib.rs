//! Core types and request pipeline for the kestrel typed HTTP API client.
//!
//! Describe an API operation once as an [`Endpoint`] - method, relative
//! path, body, query parameters, expected response shape - and let an
//! [`ApiClient`] turn it into a decoded value or a typed [`Error`]:
//!
//! - [`Endpoint`] - immutable description of one operation
//! - [`ApiClient`] - the request pipeline (resolve, build, execute, interpret)
//! - [`Delegate`] - pluggable customization (headers, codec, transport, error mapping)
//! - [`Transport`] - the component that performs the network exchange
//! - [`Request`] / [`Response`] - transport-boundary types
//! - [`Error`] and [`Result`] - the error taxonomy
//!
//! This crate contains no networking; a hyper-based [`Transport`] lives in
//! the `kestrel` crate.

mod api;
mod codec;
mod delegate;
mod endpoint;
mod error;
mod method;
pub mod prelude;
mod request;
mod response;
mod transport;

pub use api::ApiClient;
pub use codec::{ContentType, from_json, to_json};
pub use delegate::Delegate;
pub use endpoint::{Empty, Endpoint, Expect, QueryValue, RequestBody};
pub use error::{Error, Result};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use transport::Transport;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
