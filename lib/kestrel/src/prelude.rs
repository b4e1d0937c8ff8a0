//! Prelude module for convenient imports.
//!
//! ```ignore
//! use kestrel::prelude::*;
//! ```

pub use crate::{
    ApiClient, DefaultDelegate, Delegate, Empty, Endpoint, Error, Expect, HyperTransport, Method,
    Request, RequestBuilder, Response, Result, StatusCode, Transport, TransportConfig, api_client,
};
pub use serde::{Deserialize, Serialize};
