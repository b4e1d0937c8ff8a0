//! Prelude module for convenient imports.
//!
//! ```ignore
//! use kestrel_core::prelude::*;
//! ```

pub use crate::{
    ApiClient, ContentType, Delegate, Empty, Endpoint, Error, Expect, Method, Request,
    RequestBuilder, Response, Result, StatusCode, Transport, from_json, to_json,
};
