//! Typed endpoint/response HTTP API client.
//!
//! Describe each API operation once as an [`Endpoint`] and let the client
//! handle request construction, execution, and response decoding:
//!
//! ```ignore
//! use kestrel::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! struct LoginResult {
//!     token: String,
//! }
//!
//! let client = kestrel::api_client("https://api.example.com")?;
//!
//! let endpoint = Endpoint::<LoginResult>::new(Method::Post, "/login")
//!     .field("username", "alice")
//!     .field("password", "secret");
//!
//! let login = client.request(endpoint).await?;
//! println!("token: {}", login.token);
//! ```
//!
//! Customization goes through a [`Delegate`]: per-endpoint headers, body
//! codec, request decoration, error mapping, and the transport itself. This
//! crate supplies [`HyperTransport`] (hyper-util + rustls) and
//! [`DefaultDelegate`]; the pipeline and core types live in `kestrel-core`
//! and are re-exported here.

mod client;
mod config;
mod delegate;
pub mod prelude;

// Re-export transport implementation and configuration
pub use client::HyperTransport;
pub use config::{TransportConfig, TransportConfigBuilder};
pub use delegate::DefaultDelegate;

// Re-export core types
pub use kestrel_core::{
    ApiClient, ContentType, Delegate, Empty, Endpoint, Error, Expect, Method, QueryValue, Request,
    RequestBody, RequestBuilder, Response, Result, Transport, from_json, to_json,
};

// Re-export http types for status codes and headers
pub use kestrel_core::{StatusCode, header};

/// Create an [`ApiClient`] with the default delegate (hyper transport, JSON
/// codec, no extra headers).
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if the base URL cannot be parsed.
///
/// # Example
///
/// ```ignore
/// let client = kestrel::api_client("https://api.example.com")?;
/// ```
pub fn api_client(base_url: impl AsRef<str>) -> Result<ApiClient<DefaultDelegate>> {
    ApiClient::new(base_url, DefaultDelegate::new())
}
