//! Outbound API requests.

use crate::{Endpoint, SigningKey};
use bytes::Bytes;
use http::Method;
use std::collections::BTreeMap;
use url::Url;

/// Empty parameter list for calls that need no query parameters.
pub const NO_PARAMS: [(&str, &str); 0] = [];

/// One API call before signing. Built fresh for every call.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    method: Method,
    resource: String,
    query: BTreeMap<String, String>,
    body: Option<Bytes>,
}

impl OutboundRequest {
    /// Create a request for a resource relative to `/apps/{app_id}`.
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            method,
            resource: resource.into(),
            query: BTreeMap::new(),
            body: None,
        }
    }

    /// Create a GET request.
    pub fn get(resource: impl Into<String>) -> Self {
        Self::new(Method::GET, resource)
    }

    /// Create a POST request.
    pub fn post(resource: impl Into<String>) -> Self {
        Self::new(Method::POST, resource)
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add multiple query parameters.
    pub fn queries<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            self.query.insert(k.into(), v.into());
        }
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Resource relative to the app base URL.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Explicit query parameters, before signing.
    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Request body, if any.
    pub fn body_bytes(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Sign the request and resolve it against an endpoint.
    pub fn sign(&self, endpoint: &Endpoint, key: &SigningKey, timestamp: i64) -> SignedRequest {
        let mut url = endpoint.url_for(&self.resource);
        // sign the path as it goes on the wire, after percent-encoding
        let path = url.path().to_string();
        let params = key.sign(
            &self.method,
            &path,
            &self.query,
            self.body.as_deref(),
            timestamp,
        );

        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &params {
                pairs.append_pair(k, v);
            }
        }

        SignedRequest {
            method: self.method.clone(),
            path,
            url,
            params,
            body: self.body.clone(),
        }
    }
}

/// A request ready to hand to a transport.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// HTTP method.
    pub method: Method,
    /// Signed path, e.g. `/apps/20/events`.
    pub path: String,
    /// Absolute URL including every query parameter.
    pub url: Url,
    /// All query parameters, `auth_signature` included.
    pub params: BTreeMap<String, String>,
    /// Request body, sent as `application/json`.
    pub body: Option<Bytes>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Configuration;
    use crate::signature::canonical_string;

    fn endpoint() -> Endpoint {
        let config = Configuration::builder()
            .app_id("20")
            .key("12345678900000001")
            .secret("12345678900000001")
            .build();
        Endpoint::build(&config).unwrap()
    }

    #[test]
    fn test_signed_url() {
        let key = SigningKey::new("12345678900000001", "12345678900000001");
        let signed = OutboundRequest::get("/channels")
            .query("filter_by_prefix", "presence-")
            .sign(&endpoint(), &key, 1353088179);

        assert_eq!(signed.path, "/apps/20/channels");
        assert_eq!(signed.url.path(), "/apps/20/channels");

        let query: BTreeMap<String, String> = signed.url.query_pairs().into_owned().collect();
        assert_eq!(query, signed.params);
        assert_eq!(query["filter_by_prefix"], "presence-");
        assert_eq!(query["auth_timestamp"], "1353088179");

        let canonical = canonical_string(&Method::GET, "/apps/20/channels", &query);
        assert!(key.verify_hex(canonical.as_bytes(), &query["auth_signature"]));
    }

    #[test]
    fn test_signed_path_matches_wire_path() {
        let key = SigningKey::new("12345678900000001", "12345678900000001");
        let signed = OutboundRequest::get("/channels/a b").sign(&endpoint(), &key, 1353088179);

        assert_eq!(signed.path, signed.url.path());
        assert_eq!(signed.path, "/apps/20/channels/a%20b");

        let query: BTreeMap<String, String> = signed.url.query_pairs().into_owned().collect();
        let canonical = canonical_string(&Method::GET, signed.url.path(), &query);
        assert!(key.verify_hex(canonical.as_bytes(), &query["auth_signature"]));
    }

    #[test]
    fn test_body_is_hashed() {
        let key = SigningKey::new("k", "s");
        let signed = OutboundRequest::post("/events")
            .body(r#"{"name":"e"}"#)
            .sign(&endpoint(), &key, 1);

        assert!(signed.params.contains_key("body_md5"));
        assert_eq!(signed.body.as_deref(), Some(&br#"{"name":"e"}"#[..]));
    }
}
