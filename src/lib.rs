// Pusher - publish events to Pusher channels from Rust
//
// This library re-exports the client, webhook verification and logging crates
// behind a single dependency.

// Re-export the client
pub use pusher_client::*;

// Re-export optional crates
#[cfg(feature = "webhooks")]
pub use pusher_webhooks;

#[cfg(feature = "webhooks")]
pub use pusher_webhooks::{WebhookRequest, WebhookSource, WebhookVerifier};

pub use pusher_log as log;

/// Create a client configured from the `PUSHER_URL` environment variable.
///
/// Applications that want one shared client construct it here at startup and
/// pass it (or clones of it) to the code that publishes events.
pub fn from_env() -> Result<Client> {
    Client::from_env()
}

/// Create a webhook verifier with the credentials in `PUSHER_URL`.
#[cfg(feature = "webhooks")]
pub fn webhook_verifier_from_env() -> Result<WebhookVerifier> {
    WebhookVerifier::from_config(&Configuration::from_env()?)
}

pub mod prelude {
    pub use pusher_client::prelude::*;

    #[cfg(feature = "webhooks")]
    pub use pusher_webhooks::{WebhookRequest, WebhookSource, WebhookVerifier};
}
