//! Inbound webhook requests.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};
use pusher_client::{PusherError, Result, SigningKey};

/// Header carrying the app key the webhook was sent for.
pub const APP_KEY_HEADER: &str = "X-Pusher-AppKey";

/// Header carrying the hex HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "X-Pusher-HMAC-SHA256";

/// Read-only view of an inbound webhook.
///
/// Implementations hand out borrowed data only, so checking a request never
/// consumes its body.
pub trait WebhookSource {
    /// Header value by case-insensitive name.
    fn header(&self, name: &str) -> Option<&str>;

    /// Raw body bytes, exactly as received.
    fn body(&self) -> &[u8];
}

/// An inbound webhook captured as headers plus raw body.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    headers: HeaderMap,
    body: Bytes,
}

impl WebhookRequest {
    /// Wrap received headers and body.
    pub fn new(headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Build a request the way the service signs one, for exercising
    /// webhook handlers.
    pub fn signed(key: &SigningKey, body: impl Into<Bytes>) -> Result<Self> {
        let body = body.into();
        let signature = key.hmac_sha256_hex(&body);

        Self::new(HeaderMap::new(), body)
            .with_header(APP_KEY_HEADER, key.key_id())?
            .with_header(SIGNATURE_HEADER, &signature)
    }

    /// Set a header, replacing any previous value.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| PusherError::request(format!("Invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| PusherError::request(format!("Invalid value for {}: {}", name, e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// All headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }
}

impl WebhookSource for WebhookRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

impl<B: AsRef<[u8]>> WebhookSource for http::Request<B> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn body(&self) -> &[u8] {
        http::Request::body(self).as_ref()
    }
}

impl<B: Into<Bytes>> From<http::Request<B>> for WebhookRequest {
    fn from(request: http::Request<B>) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts.headers, body)
    }
}
