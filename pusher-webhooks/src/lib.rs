//! # Pusher Webhooks
//!
//! Check that inbound webhooks were sent by Pusher and decode their payload.
//!
//! Pusher signs each webhook body with the app secret and sends the hex
//! HMAC-SHA256 in `X-Pusher-HMAC-SHA256`, alongside the app key in
//! `X-Pusher-AppKey`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pusher_client::SigningKey;
//! use pusher_webhooks::{WebhookVerifier, WebhookRequest};
//!
//! fn handle(request: http::Request<Vec<u8>>) -> pusher_client::Result<()> {
//!     let verifier = WebhookVerifier::new(SigningKey::new("key", "secret"));
//!
//!     let payload = verifier.extract_data(&request)?;
//!     println!("{}", payload);
//!
//!     // the body is still available
//!     let captured = WebhookRequest::from(request);
//!     assert!(!captured.bytes().is_empty());
//!     Ok(())
//! }
//! ```

mod source;
mod verifier;

pub use source::{APP_KEY_HEADER, SIGNATURE_HEADER, WebhookRequest, WebhookSource};
pub use verifier::WebhookVerifier;
