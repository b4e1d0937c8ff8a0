//! HTTP method types.

use derive_more::Display;

/// HTTP request method for an [`Endpoint`](crate::Endpoint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET - retrieve a resource.
    #[display("GET")]
    Get,
    /// POST - create a resource.
    #[display("POST")]
    Post,
    /// PUT - replace a resource.
    #[display("PUT")]
    Put,
    /// DELETE - remove a resource.
    #[display("DELETE")]
    Delete,
    /// PATCH - partially update a resource.
    #[display("PATCH")]
    Patch,
    /// HEAD - retrieve headers only.
    #[display("HEAD")]
    Head,
    /// OPTIONS - retrieve allowed methods.
    #[display("OPTIONS")]
    Options,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
            Method::Patch => Self::PATCH,
            Method::Head => Self::HEAD,
            Method::Options => Self::OPTIONS,
        }
    }
}
