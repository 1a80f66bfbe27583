//! Request signing.
//!
//! Every API call carries `auth_key`, `auth_timestamp`, `auth_version` and,
//! when a body is present, `body_md5` as query parameters. The signature is
//! the HMAC-SHA256 of
//!
//! ```text
//! METHOD\nPATH\nk1=v1&k2=v2...
//! ```
//!
//! with the parameters sorted by key and values form-urlencoded.

use crate::{Configuration, PusherError, Result};
use hmac::{Hmac, Mac};
use http::Method;
use md5::{Digest, Md5};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Value of the `auth_version` parameter.
pub const AUTH_VERSION: &str = "1.0";

/// Query parameter names used by the signing protocol.
pub mod params {
    /// Application key.
    pub const AUTH_KEY: &str = "auth_key";
    /// Unix time in seconds.
    pub const AUTH_TIMESTAMP: &str = "auth_timestamp";
    /// Protocol version.
    pub const AUTH_VERSION: &str = "auth_version";
    /// Hex MD5 of the request body.
    pub const BODY_MD5: &str = "body_md5";
    /// Hex HMAC-SHA256 of the canonical string.
    pub const AUTH_SIGNATURE: &str = "auth_signature";
}

/// Key id and shared secret of one app.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    key_id: String,
    secret: String,
}

impl SigningKey {
    /// Create a signing key.
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: secret.into(),
        }
    }

    /// Derive the signing key from a configuration.
    pub fn from_config(config: &Configuration) -> Result<Self> {
        match (config.key.as_deref(), config.secret.as_deref()) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Ok(Self::new(key, secret))
            }
            _ => Err(PusherError::configuration(
                "Missing configuration: key and secret are required for signing",
            )),
        }
    }

    /// The public key id, sent as `auth_key`.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Lowercase hex HMAC-SHA256 of `data` under the shared secret.
    pub fn hmac_sha256_hex(&self, data: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC can take any size key");
        mac.update(data);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check a hex digest against the HMAC of `data` in constant time.
    pub fn verify_hex(&self, data: &[u8], digest: &str) -> bool {
        constant_time_compare(&self.hmac_sha256_hex(data), digest)
    }

    /// Produce the full set of query parameters for a request, signature
    /// included. Caller-supplied `auth_*` and `body_md5` entries are replaced.
    pub fn sign(
        &self,
        method: &Method,
        path: &str,
        query: &BTreeMap<String, String>,
        body: Option<&[u8]>,
        timestamp: i64,
    ) -> BTreeMap<String, String> {
        let mut signed = query.clone();
        signed.remove(params::AUTH_SIGNATURE);
        signed.insert(params::AUTH_KEY.to_string(), self.key_id.clone());
        signed.insert(params::AUTH_TIMESTAMP.to_string(), timestamp.to_string());
        signed.insert(params::AUTH_VERSION.to_string(), AUTH_VERSION.to_string());
        match body {
            Some(body) => {
                signed.insert(params::BODY_MD5.to_string(), body_md5(body));
            }
            None => {
                signed.remove(params::BODY_MD5);
            }
        }

        let canonical = canonical_string(method, path, &signed);
        let signature = self.hmac_sha256_hex(canonical.as_bytes());
        signed.insert(params::AUTH_SIGNATURE.to_string(), signature);
        signed
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("secret", &"***")
            .finish()
    }
}

/// Build the string that gets signed.
///
/// `auth_signature` is skipped if present.
pub fn canonical_string(method: &Method, path: &str, query: &BTreeMap<String, String>) -> String {
    let query = query
        .iter()
        .filter(|(key, _)| key.as_str() != params::AUTH_SIGNATURE)
        .map(|(key, value)| format!("{}={}", key, encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}\n{}\n{}", method.as_str(), path, query)
}

/// Lowercase hex MD5 of a request body.
pub fn body_md5(body: &[u8]) -> String {
    hex::encode(Md5::digest(body))
}

/// Current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
