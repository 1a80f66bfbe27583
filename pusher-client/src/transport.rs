//! HTTP transport abstraction.
//!
//! The dispatcher only needs "send this signed request, give me status and
//! body". [`ReqwestTransport`] is the default; tests and applications with
//! their own HTTP stack can plug in any [`Transport`].

use crate::{BoxError, Configuration, PusherError, Result, SignedRequest};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can perform one HTTP request.
///
/// Errors returned here are transport faults (timeouts, refused connections,
/// DNS or TLS failures). Unsuccessful statuses are not errors at this level.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send the request and wait for the full response.
    async fn send(&self, request: SignedRequest) -> std::result::Result<TransportResponse, BoxError>;
}

/// Transport backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client honouring the configured proxy and timeout.
    pub fn new(config: &Configuration) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(format!("pusher-rust/{}", env!("CARGO_PKG_VERSION")))
            // 3xx answers are mapped to errors, never followed
            .redirect(reqwest::redirect::Policy::none());

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(proxy) = &config.proxy {
            let mut reqwest_proxy = reqwest::Proxy::all(proxy.url()).map_err(PusherError::http)?;
            if let Some(user) = &proxy.user {
                reqwest_proxy =
                    reqwest_proxy.basic_auth(user, proxy.password.as_deref().unwrap_or_default());
            }
            builder = builder.proxy(reqwest_proxy);
        }

        let inner = builder.build().map_err(PusherError::http)?;
        Ok(Self { inner })
    }

    /// Wrap an existing `reqwest` client.
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: SignedRequest) -> std::result::Result<TransportResponse, BoxError> {
        let mut builder = self.inner.request(request.method, request.url);

        if let Some(body) = request.body {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(TransportResponse { status, body })
    }
}
