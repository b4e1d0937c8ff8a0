//! Body encode/decode helpers.
//!
//! These free functions are the default codec used by
//! [`Delegate::encode_body`](crate::Delegate::encode_body) and
//! [`Delegate::decode_body`](crate::Delegate::decode_body). A delegate may
//! substitute its own implementation (snake-case rewriting, date formats,
//! a non-JSON codec) by overriding those hooks.

use bytes::Bytes;

use crate::Result;

/// Content type for request and response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON body (`application/json; charset=utf-8`).
    Json,
    /// Plain text (`text/plain`), used for the default `Accept` header.
    PlainText,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json; charset=utf-8",
            Self::PlainText => "text/plain",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns [`Error::JsonSerialization`](crate::Error::JsonSerialization) if
/// serialization fails.
///
/// # Example
///
/// ```
/// use kestrel_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Credentials { username: String }
///
/// let creds = Credentials { username: "alice".to_string() };
/// let bytes = to_json(&creds).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"username":"alice"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes with path-aware error messages.
///
/// Uses `serde_path_to_error` so a decode failure names the exact field that
/// did not match (e.g., "user.address.city").
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`](crate::Error::JsonDeserialization)
/// if deserialization fails.
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
