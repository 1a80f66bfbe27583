//! Webhook authenticity checks.

use crate::{APP_KEY_HEADER, SIGNATURE_HEADER, WebhookSource};
use pusher_client::{Client, Configuration, PusherError, Result, SigningKey};
use pusher_log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Verifies that inbound webhooks were sent by Pusher for this app.
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    key: SigningKey,
}

impl WebhookVerifier {
    /// Create a verifier for the given app key and secret.
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Create a verifier from a configuration with key and secret set.
    pub fn from_config(config: &Configuration) -> Result<Self> {
        Ok(Self::new(SigningKey::from_config(config)?))
    }

    /// Create a verifier sharing a client's credentials.
    pub fn from_client(client: &Client) -> Result<Self> {
        Ok(Self::new(client.signing_key()?))
    }

    /// The app key webhooks must be addressed to.
    pub fn key_id(&self) -> &str {
        self.key.key_id()
    }

    /// Check that a webhook carries a valid signature for its body.
    ///
    /// A missing or different app key is an authentication error rather than
    /// `false`, since it means the webhook targets another app. A missing
    /// signature header yields `false`.
    pub fn is_authentic<S: WebhookSource + ?Sized>(&self, request: &S) -> Result<bool> {
        if request.header(APP_KEY_HEADER) != Some(self.key.key_id()) {
            warn!(target: "pusher::webhooks", "Webhook app key does not match configured key");
            return Err(PusherError::authentication(
                "Configured key does not match the key sent with the webhook",
            ));
        }

        let Some(signature) = request.header(SIGNATURE_HEADER) else {
            debug!(target: "pusher::webhooks", "Webhook has no {} header", SIGNATURE_HEADER);
            return Ok(false);
        };

        Ok(self.key.verify_hex(request.body(), signature))
    }

    /// Verify a webhook and decode its JSON body.
    pub fn extract_data<S: WebhookSource + ?Sized>(&self, request: &S) -> Result<Value> {
        self.extract_as(request)
    }

    /// Verify a webhook and decode its JSON body into `T`.
    pub fn extract_as<T, S>(&self, request: &S) -> Result<T>
    where
        T: DeserializeOwned,
        S: WebhookSource + ?Sized,
    {
        if !self.is_authentic(request)? {
            warn!(target: "pusher::webhooks", "Rejected webhook with invalid signature");
            return Err(PusherError::authentication("Request signature invalid."));
        }

        Ok(serde_json::from_slice(request.body())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WebhookRequest;
    use http::HeaderMap;
    use serde::Deserialize;

    const BODY: &str =
        r#"{"event_type":"channel_existence","data":{"event":"occupied","channel":"test-aqss22"}}"#;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SigningKey::new("12345678900000001", "12345678900000001"))
    }

    fn signed(body: &str) -> WebhookRequest {
        WebhookRequest::signed(&SigningKey::new("12345678900000001", "12345678900000001"), body.to_string())
            .unwrap()
    }

    #[test]
    fn test_authentic() {
        assert!(verifier().is_authentic(&signed(BODY)).unwrap());
    }

    #[test]
    fn test_wrong_secret_is_not_authentic() {
        let request = WebhookRequest::signed(&SigningKey::new("12345678900000001", "other"), BODY)
            .unwrap();
        assert!(!verifier().is_authentic(&request).unwrap());
    }

    #[test]
    fn test_tampered_body_is_not_authentic() {
        let request = signed(BODY);
        let signature = request.header(SIGNATURE_HEADER).unwrap().to_string();
        let tampered = WebhookRequest::new(request.headers().clone(), "{}")
            .with_header(SIGNATURE_HEADER, &signature)
            .unwrap();

        assert!(!verifier().is_authentic(&tampered).unwrap());
    }

    #[test]
    fn test_key_mismatch_is_error() {
        let request = signed(BODY).with_header(APP_KEY_HEADER, "someone-else").unwrap();
        assert!(verifier().is_authentic(&request).unwrap_err().is_authentication());
        assert!(verifier().extract_data(&request).unwrap_err().is_authentication());
    }

    #[test]
    fn test_missing_key_is_error() {
        let request = WebhookRequest::new(HeaderMap::new(), BODY);
        assert!(verifier().is_authentic(&request).unwrap_err().is_authentication());
    }

    #[test]
    fn test_missing_signature_is_not_authentic() {
        let request = WebhookRequest::new(HeaderMap::new(), BODY)
            .with_header(APP_KEY_HEADER, "12345678900000001")
            .unwrap();
        assert!(!verifier().is_authentic(&request).unwrap());
    }

    #[test]
    fn test_extract_data() {
        let request = signed(BODY);
        let data = verifier().extract_data(&request).unwrap();

        assert_eq!(data["event_type"], "channel_existence");
        assert_eq!(data["data"]["channel"], "test-aqss22");

        // body is untouched
        assert_eq!(request.body(), BODY.as_bytes());
    }

    #[test]
    fn test_extract_invalid_signature() {
        let request = signed(BODY).with_header(SIGNATURE_HEADER, "00").unwrap();
        let err = verifier().extract_data(&request).unwrap_err();
        assert_eq!(err.to_string(), "Request signature invalid.");
    }

    #[test]
    fn test_extract_as() {
        #[derive(Deserialize)]
        struct Existence {
            event_type: String,
            data: Detail,
        }

        #[derive(Deserialize)]
        struct Detail {
            event: String,
            channel: String,
        }

        let existence: Existence = verifier().extract_as(&signed(BODY)).unwrap();
        assert_eq!(existence.event_type, "channel_existence");
        assert_eq!(existence.data.event, "occupied");
        assert_eq!(existence.data.channel, "test-aqss22");
    }

    #[test]
    fn test_authentic_but_not_json() {
        let err = verifier().extract_data(&signed("not json")).unwrap_err();
        assert!(matches!(err, PusherError::Json(_)));
    }
}
