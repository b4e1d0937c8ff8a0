//! Typed endpoint descriptions.
//!
//! An [`Endpoint`] is an immutable description of one API operation: method,
//! relative path, optional body, query parameters, and the expected response
//! shape. Endpoints are cheap to build per call and are consumed by
//! [`ApiClient::request`](crate::ApiClient::request) and friends.
//!
//! # Example
//!
//! ```
//! use kestrel_core::{Endpoint, Method};
//!
//! #[derive(serde::Deserialize)]
//! struct LoginResult { token: String }
//!
//! let endpoint = Endpoint::<LoginResult>::new(Method::Post, "/login")
//!     .field("username", "alice")
//!     .field("password", "secret");
//! ```

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{Error, Method, Result};

/// Marker type for endpoints whose response body must never be parsed.
///
/// Use [`Endpoint::empty`] to build such endpoints; the pipeline produces
/// this value without looking at the response bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
pub struct Empty;

/// How the response body of an endpoint is interpreted.
///
/// The variant is fixed at endpoint construction, so decode-branch selection
/// needs no runtime type inspection. The `Empty` and `Optional` variants
/// carry a producer for the no-decode value of type `R`.
pub enum Expect<R> {
    /// No body is expected; the payload is produced without touching the
    /// response bytes.
    Empty(fn() -> R),
    /// Absence is a legitimate value: a `204 No Content` response produces
    /// it without attempting a decode. Any other success status decodes the
    /// body as usual.
    Optional(fn() -> R),
    /// The body is decoded into `R`.
    Value,
}

impl<R> Clone for Expect<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Expect<R> {}

impl<R> std::fmt::Debug for Expect<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(_) => f.write_str("Empty"),
            Self::Optional(_) => f.write_str("Optional"),
            Self::Value => f.write_str("Value"),
        }
    }
}

/// A query parameter value: a single entry, or a list expanding to repeated
/// entries under the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// One `name=value` entry.
    Single(String),
    /// One `name=value` entry per element, preserving order.
    Many(Vec<String>),
}

/// Request body forms.
///
/// At most one form is present per endpoint. `Fields` is encoded by the
/// generic JSON object encoder; `Value` goes through the delegate's codec.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Plain key-value mapping built with [`Endpoint::field`] / [`Endpoint::fields`].
    Fields(serde_json::Map<String, serde_json::Value>),
    /// Arbitrary serializable payload set with [`Endpoint::json`].
    Value(serde_json::Value),
}

/// Immutable description of one API operation, generic over the expected
/// response type `R`.
pub struct Endpoint<R> {
    method: Method,
    path: String,
    body: Option<RequestBody>,
    query: Vec<(String, QueryValue)>,
    expect: Expect<R>,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Clone for Endpoint<R> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            path: self.path.clone(),
            body: self.body.clone(),
            query: self.query.clone(),
            expect: self.expect,
            _marker: PhantomData,
        }
    }
}

impl<R> std::fmt::Debug for Endpoint<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("body", &self.body)
            .field("query", &self.query)
            .field("expect", &self.expect)
            .finish()
    }
}

impl<R: DeserializeOwned> Endpoint<R> {
    /// Creates an endpoint whose response body is decoded into `R`.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self::with_expect(method, path, Expect::Value)
    }
}

impl Endpoint<Empty> {
    /// Creates an endpoint that expects no response body.
    ///
    /// The response bytes are never inspected, even when the server returns
    /// content with a success status.
    #[must_use]
    pub fn empty(method: Method, path: impl Into<String>) -> Self {
        Self::with_expect(method, path, Expect::Empty(|| Empty))
    }
}

impl<T: DeserializeOwned> Endpoint<Option<T>> {
    /// Creates an endpoint where an absent body is a legitimate result.
    ///
    /// A `204 No Content` response yields `None` without a decode attempt;
    /// any other success status decodes the body into `Some(T)`.
    #[must_use]
    pub fn optional(method: Method, path: impl Into<String>) -> Self {
        Self::with_expect(method, path, Expect::Optional(|| None))
    }
}

impl<R> Endpoint<R> {
    fn with_expect(method: Method, path: impl Into<String>, expect: Expect<R>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            expect,
            _marker: PhantomData,
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Relative path, as given at construction.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Query parameters in insertion order.
    #[must_use]
    pub fn query_params(&self) -> &[(String, QueryValue)] {
        &self.query
    }

    /// How the response body is interpreted.
    #[must_use]
    pub const fn expect(&self) -> Expect<R> {
        self.expect
    }

    /// Appends a single query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl std::fmt::Display) -> Self {
        self.query
            .push((name.into(), QueryValue::Single(value.to_string())));
        self
    }

    /// Appends a query parameter when the value is present; contributes
    /// nothing otherwise.
    #[must_use]
    pub fn query_opt(self, name: impl Into<String>, value: Option<impl std::fmt::Display>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Appends a list-valued query parameter, expanding to one entry per
    /// element with the same name, preserving order.
    #[must_use]
    pub fn query_many<I>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: std::fmt::Display,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.query.push((name.into(), QueryValue::Many(values)));
        self
    }

    /// Adds one key to the plain key-value body mapping.
    ///
    /// Replaces a previously set [`Endpoint::json`] body; the two forms are
    /// mutually exclusive.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let mut map = match self.body.take() {
            Some(RequestBody::Fields(map)) => map,
            _ => serde_json::Map::new(),
        };
        map.insert(name.into(), value.into());
        self.body = Some(RequestBody::Fields(map));
        self
    }

    /// Adds several keys to the plain key-value body mapping.
    #[must_use]
    pub fn fields<I, K, V>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        entries
            .into_iter()
            .fold(self, |endpoint, (name, value)| endpoint.field(name, value))
    }

    /// Sets an arbitrary serializable payload as the request body.
    ///
    /// The payload is converted to a JSON value here; the delegate's codec
    /// turns it into bytes when the request is built. Replaces a previously
    /// set key-value body.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be represented as JSON.
    pub fn json<B: serde::Serialize>(mut self, body: &B) -> Result<Self> {
        self.body = Some(RequestBody::Value(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Resolves this endpoint against a base URL.
    ///
    /// Separator characters are trimmed from both ends of the relative path
    /// before its segments are appended to the base URL's path, then query
    /// parameters are attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the base URL cannot take path
    /// segments (e.g., a `data:` URL).
    pub fn resolve(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::invalid_endpoint("base URL cannot have path segments"))?;
            segments.pop_if_empty();
            for segment in self.path.trim_matches('/').split('/') {
                if !segment.is_empty() {
                    segments.push(segment);
                }
            }
        }

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                match value {
                    QueryValue::Single(value) => {
                        pairs.append_pair(name, value);
                    }
                    QueryValue::Many(values) => {
                        for value in values {
                            pairs.append_pair(name, value);
                        }
                    }
                }
            }
        }

        Ok(url)
    }
}
