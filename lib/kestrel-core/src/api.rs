//! The request pipeline.
//!
//! [`ApiClient`] owns a base URL and a [`Delegate`] and turns an
//! [`Endpoint`] into a decoded payload (or a typed error) in four steps:
//! resolve the URL, build the transport request, execute it, interpret the
//! response. Interpretation classifies the status code, then decodes the
//! body with a fixed priority: the empty-response marker first, the
//! optional marker paired with `204 No Content` second, the delegate's
//! codec last. Getting that order wrong would either decode bytes that do
//! not exist or discard a legitimately decodable value.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tracing::{Instrument, Level, debug, info, span, warn};
use url::Url;

use crate::{
    ContentType, Delegate, Empty, Endpoint, Error, Expect, Request, RequestBody, Response, Result,
    Transport,
};

/// Typed API client: base URL plus customization delegate.
///
/// Cloning is cheap (the delegate is shared behind an `Arc`) and every
/// request is an independent unit of work, so one client can serve many
/// concurrent callers.
///
/// # Example
///
/// ```ignore
/// let client = ApiClient::new("https://api.example.com", MyDelegate::new())?;
///
/// let endpoint = Endpoint::<LoginResult>::new(Method::Post, "/login")
///     .field("username", "u")
///     .field("password", "p");
/// let login = client.request(endpoint).await?;
/// ```
#[derive(Debug)]
pub struct ApiClient<D> {
    base_url: Url,
    delegate: Arc<D>,
}

impl<D> Clone for ApiClient<D> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            delegate: Arc::clone(&self.delegate),
        }
    }
}

impl<D: Delegate> ApiClient<D> {
    /// Create a client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the base URL cannot be parsed.
    pub fn new(base_url: impl AsRef<str>, delegate: D) -> Result<Self> {
        Ok(Self::with_url(Url::parse(base_url.as_ref())?, delegate))
    }

    /// Create a client with a pre-parsed base URL.
    #[must_use]
    pub fn with_url(base_url: Url, delegate: D) -> Self {
        Self {
            base_url,
            delegate: Arc::new(delegate),
        }
    }

    /// The base URL endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The customization delegate.
    #[must_use]
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// Execute an endpoint and return the decoded payload.
    ///
    /// # Errors
    ///
    /// Returns the terminal pipeline error: invalid endpoint, transport
    /// failure, unclassifiable status, delegate-mapped HTTP error, or
    /// decode failure.
    pub async fn request<R>(&self, endpoint: Endpoint<R>) -> Result<R>
    where
        R: DeserializeOwned,
    {
        Ok(self.perform(&endpoint).await?.into_body())
    }

    /// Execute an endpoint that expects no response body.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ApiClient::request`]; parse errors cannot
    /// occur since the body is never inspected.
    pub async fn request_empty(&self, endpoint: Endpoint<Empty>) -> Result<()> {
        self.perform(&endpoint).await.map(|_| ())
    }

    /// Execute an endpoint and return the full response envelope (payload
    /// plus status code and headers).
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ApiClient::request`].
    pub async fn full_request<R>(&self, endpoint: Endpoint<R>) -> Result<Response<R>>
    where
        R: DeserializeOwned,
    {
        self.perform(&endpoint).await
    }

    /// Callback-style adapter around [`ApiClient::request`].
    ///
    /// Spawns the request onto the current tokio runtime; `on_complete`
    /// fires exactly once, after the request finishes, with the same
    /// success/failure payload the direct form would return.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn request_with_callback<R, F>(&self, endpoint: Endpoint<R>, on_complete: F)
    where
        R: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<R>) + Send + 'static,
    {
        let client = self.clone();
        drop(tokio::spawn(async move {
            on_complete(client.request(endpoint).await);
        }));
    }

    /// Single-value channel adapter around [`ApiClient::request`].
    ///
    /// The returned receiver resolves exactly once with the request
    /// outcome. Dropping the receiver abandons interest in the result but
    /// does not cancel the in-flight request.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn request_channel<R>(&self, endpoint: Endpoint<R>) -> oneshot::Receiver<Result<R>>
    where
        R: DeserializeOwned + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let client = self.clone();
        drop(tokio::spawn(async move {
            // Send fails only when the receiver is gone; nothing to do then.
            let _ = tx.send(client.request(endpoint).await);
        }));
        rx
    }

    async fn perform<R>(&self, endpoint: &Endpoint<R>) -> Result<Response<R>>
    where
        R: DeserializeOwned,
    {
        let span = span!(
            Level::INFO,
            "http_request",
            method = %endpoint.method(),
            path = endpoint.path(),
        );
        self.perform_inner(endpoint).instrument(span).await
    }

    async fn perform_inner<R>(&self, endpoint: &Endpoint<R>) -> Result<Response<R>>
    where
        R: DeserializeOwned,
    {
        let url = endpoint.resolve(&self.base_url)?;
        let request = self.build_request(endpoint, url.clone())?;

        debug!(url = %url, "sending request");
        let start = Instant::now();

        let result = self.delegate.transport().execute(request).await;
        // u128 millis; saturate rather than panic on absurd durations
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, elapsed_ms, "transport failed");
                return Err(err);
            }
        };

        let outcome = self.interpret(endpoint, &url, response);
        match &outcome {
            Ok(response) => info!(status = response.status(), elapsed_ms, "request completed"),
            Err(err) => warn!(error = %err, elapsed_ms, "request failed"),
        }
        outcome
    }

    /// Turn a resolved endpoint into a transport-ready request.
    fn build_request<R>(&self, endpoint: &Endpoint<R>, url: Url) -> Result<Request> {
        let mut builder = Request::builder(endpoint.method(), url);

        // Empty-response endpoints advertise no Accept preference.
        if !matches!(endpoint.expect(), Expect::Empty(_)) {
            builder = builder.header("Accept", ContentType::PlainText.as_str());
        }

        if let Some(body) = endpoint.body() {
            let bytes = match body {
                RequestBody::Fields(map) => crate::to_json(map)?,
                RequestBody::Value(value) => self.delegate.encode_body(value)?,
            };
            builder = builder
                .header("Content-Type", ContentType::Json.as_str())
                .body(bytes);
        }

        let mut request = builder.build();
        request.headers_mut().extend(self.delegate.headers(endpoint));
        Ok(self.delegate.decorate(request))
    }

    /// Classify the status code and decode (or error-map) the body.
    fn interpret<R>(
        &self,
        endpoint: &Endpoint<R>,
        url: &Url,
        response: Response<Bytes>,
    ) -> Result<Response<R>>
    where
        R: DeserializeOwned,
    {
        let (raw_status, headers, body) = response.into_parts();
        let status =
            StatusCode::from_u16(raw_status).map_err(|_| Error::UnknownStatus(raw_status))?;

        if !status.is_success() {
            return Err(self.delegate.error_for(url, status, &body));
        }

        // Decode priority: empty marker, then optional + 204, then the codec.
        let data = match endpoint.expect() {
            Expect::Empty(make) => make(),
            Expect::Optional(make) if status == StatusCode::NO_CONTENT => make(),
            _ => self.delegate.decode_body(&body)?,
        };

        Ok(Response::new(raw_status, headers, data))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use assert2::let_assert;

    use super::*;
    use crate::{Method, Transport};

    /// Stub transport returning a canned response and recording the request.
    struct StubTransport {
        status: u16,
        headers: HashMap<String, String>,
        body: Bytes,
        seen: Mutex<Option<Request>>,
    }

    impl StubTransport {
        fn new(status: u16, body: impl Into<Bytes>) -> Self {
            Self {
                status,
                headers: HashMap::new(),
                body: body.into(),
                seen: Mutex::new(None),
            }
        }

        fn with_header(mut self, name: &str, value: &str) -> Self {
            self.headers.insert(name.to_string(), value.to_string());
            self
        }

        fn seen(&self) -> Request {
            self.seen
                .lock()
                .expect("lock")
                .clone()
                .expect("a request was executed")
        }
    }

    impl Transport for StubTransport {
        fn execute(
            &self,
            request: Request,
        ) -> impl std::future::Future<Output = Result<Response<Bytes>>> + Send {
            *self.seen.lock().expect("lock") = Some(request);
            std::future::ready(Ok(Response::new(
                self.status,
                self.headers.clone(),
                self.body.clone(),
            )))
        }
    }

    /// Stub transport that always fails with a timeout.
    struct TimeoutTransport;

    impl Transport for TimeoutTransport {
        fn execute(
            &self,
            _request: Request,
        ) -> impl std::future::Future<Output = Result<Response<Bytes>>> + Send {
            std::future::ready(Err(Error::Timeout))
        }
    }

    struct StubDelegate<T> {
        transport: T,
    }

    impl<T: Transport + 'static> Delegate for StubDelegate<T> {
        type Transport = T;

        fn transport(&self) -> &Self::Transport {
            &self.transport
        }
    }

    fn client_with(status: u16, body: &str) -> ApiClient<StubDelegate<StubTransport>> {
        let delegate = StubDelegate {
            transport: StubTransport::new(status, body.to_string()),
        };
        ApiClient::new("https://api.example.com/", delegate).expect("client")
    }

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Token {
        token: String,
    }

    #[tokio::test]
    async fn request_decodes_payload() {
        let client = client_with(200, r#"{"token":"abc"}"#);
        let endpoint = Endpoint::<Token>::new(Method::Post, "/login")
            .field("username", "u")
            .field("password", "p");

        let token = client.request(endpoint).await.expect("payload");
        assert_eq!(token.token, "abc");

        let seen = client.delegate().transport.seen();
        assert_eq!(seen.method(), Method::Post);
        assert_eq!(seen.url().as_str(), "https://api.example.com/login");
        assert_eq!(seen.header("Accept"), Some("text/plain"));
        assert_eq!(
            seen.header("Content-Type"),
            Some("application/json; charset=utf-8")
        );
        // serde_json::Map orders keys alphabetically
        assert_eq!(
            seen.body().expect("body").as_ref(),
            br#"{"password":"p","username":"u"}"#
        );
    }

    #[tokio::test]
    async fn full_request_returns_envelope() {
        let delegate = StubDelegate {
            transport: StubTransport::new(200, r#"{"token":"abc"}"#.to_string())
                .with_header("x-request-id", "r-1"),
        };
        let client = ApiClient::new("https://api.example.com", delegate).expect("client");

        let endpoint = Endpoint::<Token>::new(Method::Get, "session");
        let response = client.full_request(endpoint).await.expect("envelope");

        assert_eq!(response.status(), 200);
        assert_eq!(response.header("x-request-id"), Some("r-1"));
        assert_eq!(response.body().token, "abc");
    }

    #[tokio::test]
    async fn empty_expectation_never_touches_body() {
        // Malformed body with a success status must not produce a parse error.
        let client = client_with(200, "definitely-not-json");
        let endpoint = Endpoint::<Empty>::empty(Method::Delete, "sessions/current");

        client.request_empty(endpoint).await.expect("ok");
    }

    #[tokio::test]
    async fn empty_expectation_sends_no_accept_header() {
        let client = client_with(204, "");
        let endpoint = Endpoint::<Empty>::empty(Method::Delete, "sessions/current");
        client.request_empty(endpoint).await.expect("ok");

        let seen = client.delegate().transport.seen();
        assert_eq!(seen.header("Accept"), None);
    }

    #[tokio::test]
    async fn absent_body_sends_no_bytes_and_no_content_type() {
        let client = client_with(200, r#"{"token":"abc"}"#);
        let endpoint = Endpoint::<Token>::new(Method::Get, "session");
        client.request(endpoint).await.expect("ok");

        let seen = client.delegate().transport.seen();
        assert!(seen.body().is_none());
        assert_eq!(seen.header("Content-Type"), None);
    }

    #[tokio::test]
    async fn optional_with_no_content_is_absent() {
        let client = client_with(204, "");
        let endpoint = Endpoint::<Option<Token>>::optional(Method::Get, "session");

        let result = client.request(endpoint).await.expect("ok");
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn optional_with_body_decodes() {
        let client = client_with(200, r#"{"token":"abc"}"#);
        let endpoint = Endpoint::<Option<Token>>::optional(Method::Get, "session");

        let result = client.request(endpoint).await.expect("ok");
        assert_eq!(
            result,
            Some(Token {
                token: "abc".to_string()
            })
        );
    }

    #[tokio::test]
    async fn parse_error_carries_decode_context() {
        let client = client_with(200, r#"{"wrong":"shape"}"#);
        let endpoint = Endpoint::<Token>::new(Method::Get, "session");

        let err = client.request(endpoint).await.expect_err("should fail");
        let_assert!(Error::JsonDeserialization { message, .. } = err);
        assert!(message.contains("token"), "unexpected message: {message}");
    }

    #[tokio::test]
    async fn failure_status_routes_through_error_hook() {
        // Body decodable as Token, but a 401 must never reach the decoder.
        let client = client_with(401, r#"{"token":"abc"}"#);
        let endpoint = Endpoint::<Token>::new(Method::Post, "login");

        let err = client.request(endpoint).await.expect_err("should fail");
        let_assert!(Error::Http { status, body: Some(body), .. } = err);
        assert_eq!(status, 401);
        assert_eq!(body.as_ref(), br#"{"token":"abc"}"#);
    }

    #[tokio::test]
    async fn unclassifiable_status_is_terminal() {
        let client = client_with(1042, "");
        let endpoint = Endpoint::<Empty>::empty(Method::Get, "ping");

        let err = client.request_empty(endpoint).await.expect_err("should fail");
        let_assert!(Error::UnknownStatus(status) = err);
        assert_eq!(status, 1042);
    }

    #[tokio::test]
    async fn transport_failure_passes_through_unmapped() {
        let client = ApiClient::new(
            "https://api.example.com",
            StubDelegate {
                transport: TimeoutTransport,
            },
        )
        .expect("client");
        let endpoint = Endpoint::<Empty>::empty(Method::Get, "ping");

        let err = client.request_empty(endpoint).await.expect_err("should fail");
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn delegate_headers_and_decoration_are_applied() {
        struct AuthDelegate {
            transport: StubTransport,
        }

        impl Delegate for AuthDelegate {
            type Transport = StubTransport;

            fn transport(&self) -> &Self::Transport {
                &self.transport
            }

            fn headers<R>(&self, _endpoint: &Endpoint<R>) -> HashMap<String, String> {
                HashMap::from([("X-Api-Version".to_string(), "7".to_string())])
            }

            fn decorate(&self, mut request: Request) -> Request {
                request
                    .headers_mut()
                    .insert("Authorization".to_string(), "Bearer tok".to_string());
                request
            }
        }

        let client = ApiClient::new(
            "https://api.example.com",
            AuthDelegate {
                transport: StubTransport::new(204, ""),
            },
        )
        .expect("client");

        let endpoint = Endpoint::<Empty>::empty(Method::Get, "ping");
        client.request_empty(endpoint).await.expect("ok");

        let seen = client.delegate().transport.seen();
        assert_eq!(seen.header("X-Api-Version"), Some("7"));
        assert_eq!(seen.header("Authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn custom_error_hook_shapes_the_error() {
        struct PickyDelegate {
            transport: StubTransport,
        }

        impl Delegate for PickyDelegate {
            type Transport = StubTransport;

            fn transport(&self) -> &Self::Transport {
                &self.transport
            }

            fn error_for(&self, url: &Url, status: StatusCode, _body: &Bytes) -> Error {
                Error::http(status.as_u16(), format!("rejected by {}", url.path()))
            }
        }

        let client = ApiClient::new(
            "https://api.example.com",
            PickyDelegate {
                transport: StubTransport::new(403, "{}"),
            },
        )
        .expect("client");

        let endpoint = Endpoint::<Empty>::empty(Method::Get, "secrets");
        let err = client.request_empty(endpoint).await.expect_err("should fail");
        let_assert!(Error::Http { status, message, .. } = err);
        assert_eq!(status, 403);
        assert_eq!(message, "rejected by /secrets");
    }

    #[tokio::test]
    async fn encode_failure_aborts_before_the_transport() {
        struct FailingCodec {
            transport: StubTransport,
        }

        impl Delegate for FailingCodec {
            type Transport = StubTransport;

            fn transport(&self) -> &Self::Transport {
                &self.transport
            }

            fn encode_body(&self, _body: &serde_json::Value) -> Result<Bytes> {
                Err(Error::JsonSerialization(serde::ser::Error::custom(
                    "refused",
                )))
            }
        }

        let client = ApiClient::new(
            "https://api.example.com",
            FailingCodec {
                transport: StubTransport::new(200, "{}"),
            },
        )
        .expect("client");

        let endpoint = Endpoint::<Empty>::empty(Method::Post, "things")
            .json(&serde_json::json!({"id": 7}))
            .expect("json body");
        let err = client.request_empty(endpoint).await.expect_err("should fail");

        assert!(matches!(err, Error::JsonSerialization(_)));
        // The request never reached the transport.
        assert!(client.delegate().transport.seen.lock().expect("lock").is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn callback_adapter_fires_exactly_once() {
        let client = client_with(200, r#"{"token":"abc"}"#);
        let endpoint = Endpoint::<Token>::new(Method::Get, "session");

        let (tx, rx) = std::sync::mpsc::channel();
        client.request_with_callback(endpoint, move |outcome| {
            tx.send(outcome).expect("send");
        });

        let outcome = rx.recv().expect("one completion");
        assert_eq!(outcome.expect("payload").token, "abc");
        // The sender was consumed by the FnOnce; a second signal is impossible.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn channel_adapter_delivers_same_outcome() {
        let client = client_with(401, "");
        let endpoint = Endpoint::<Token>::new(Method::Get, "session");

        let rx = client.request_channel(endpoint);
        let outcome = rx.await.expect("one completion");
        let_assert!(Err(Error::Http { status: 401, .. }) = outcome);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = ApiClient::new(
            "not a url",
            StubDelegate {
                transport: TimeoutTransport,
            },
        );
        let_assert!(Err(Error::InvalidUrl(_)) = result);
    }
}
