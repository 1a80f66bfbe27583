//! Signed request dispatch.
//!
//! The dispatcher owns the live configuration, signs each
//! [`OutboundRequest`], hands it to a [`Transport`] and maps the outcome to
//! a [`Response`] or a [`PusherError`]. Nothing is retried here.

use crate::signature::current_timestamp;
use crate::{
    Configuration, Endpoint, OutboundRequest, PendingRequest, PusherError, ReqwestTransport,
    Response, Result, SignedRequest, SigningKey, Transport, TransportResponse,
};
use parking_lot::RwLock;
use pusher_log::{debug, warn};
use std::sync::Arc;

/// Signs and sends API requests for one app.
pub struct Dispatcher {
    state: RwLock<State>,
    transport_override: Option<Arc<dyn Transport>>,
}

struct State {
    config: Configuration,
    endpoint: Option<Endpoint>,
    transport: Option<Arc<dyn Transport>>,
}

impl Dispatcher {
    /// Create a dispatcher using the default `reqwest` transport.
    pub fn new(config: Configuration) -> Self {
        Self::build(config, None)
    }

    /// Create a dispatcher that sends through a custom transport.
    pub fn with_transport(config: Configuration, transport: Arc<dyn Transport>) -> Self {
        Self::build(config, Some(transport))
    }

    fn build(config: Configuration, transport_override: Option<Arc<dyn Transport>>) -> Self {
        Self {
            state: RwLock::new(State {
                config,
                endpoint: None,
                transport: None,
            }),
            transport_override,
        }
    }

    /// Snapshot of the current configuration.
    pub fn configuration(&self) -> Configuration {
        self.state.read().config.clone()
    }

    /// Whether every required configuration value is present.
    pub fn is_configured(&self) -> bool {
        self.state.read().config.is_configured()
    }

    /// Change the configuration. Drops the cached endpoint and default
    /// transport so the next request sees the new values.
    pub fn update<R>(&self, f: impl FnOnce(&mut Configuration) -> R) -> R {
        let mut state = self.state.write();
        let result = f(&mut state.config);
        state.endpoint = None;
        state.transport = None;
        result
    }

    /// The signing key for the current configuration.
    pub fn signing_key(&self) -> Result<SigningKey> {
        SigningKey::from_config(&self.state.read().config)
    }

    /// The endpoint for the current configuration, built on first use.
    pub fn endpoint(&self) -> Result<Endpoint> {
        if let Some(endpoint) = &self.state.read().endpoint {
            return Ok(endpoint.clone());
        }

        let mut state = self.state.write();
        if let Some(endpoint) = &state.endpoint {
            return Ok(endpoint.clone());
        }
        let endpoint = Endpoint::build(&state.config)?;
        state.endpoint = Some(endpoint.clone());
        Ok(endpoint)
    }

    fn transport(&self) -> Result<Arc<dyn Transport>> {
        if let Some(transport) = &self.transport_override {
            return Ok(transport.clone());
        }
        if let Some(transport) = &self.state.read().transport {
            return Ok(transport.clone());
        }

        let mut state = self.state.write();
        if let Some(transport) = &state.transport {
            return Ok(transport.clone());
        }
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&state.config)?);
        state.transport = Some(transport.clone());
        Ok(transport)
    }

    /// Sign a request against the current configuration.
    pub fn prepare(&self, request: &OutboundRequest) -> Result<SignedRequest> {
        let endpoint = self.endpoint()?;
        let key = self.signing_key()?;
        Ok(request.sign(&endpoint, &key, current_timestamp()))
    }

    /// Send a request and wait for the outcome.
    pub async fn send(&self, request: OutboundRequest) -> Result<Response> {
        let signed = self.prepare(&request)?;
        let transport = self.transport()?;
        execute(transport, signed).await
    }

    /// Send a request in the background.
    ///
    /// Signing happens before this returns, so configuration problems are
    /// reported through the handle without touching the network.
    pub fn send_async(&self, request: OutboundRequest) -> PendingRequest {
        let prepared = self
            .prepare(&request)
            .and_then(|signed| Ok((signed, self.transport()?)));

        match prepared {
            Ok((signed, transport)) => PendingRequest::spawn(execute(transport, signed)),
            Err(err) => PendingRequest::ready(Err(err)),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.state.read().config)
            .field("custom_transport", &self.transport_override.is_some())
            .finish()
    }
}

async fn execute(transport: Arc<dyn Transport>, request: SignedRequest) -> Result<Response> {
    let method = request.method.clone();
    let path = request.path.clone();
    debug!(target: "pusher::dispatch", "{} {}", method, path);

    let response = transport.send(request).await.map_err(|e| {
        warn!(target: "pusher::dispatch", "{} {} failed in transport: {}", method, path, e);
        PusherError::http(e)
    })?;

    debug!(target: "pusher::dispatch", "{} {} -> {}", method, path, response.status);
    handle_response(&path, response)
}

/// Turn a raw transport response into the caller-facing outcome.
pub(crate) fn handle_response(path: &str, response: TransportResponse) -> Result<Response> {
    if response.is_success() {
        return Response::from_body(&response.body);
    }

    let body = String::from_utf8_lossy(&response.body);
    Err(PusherError::from_status(response.status, path, body.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoxError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<SignedRequest>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(
            &self,
            request: SignedRequest,
        ) -> std::result::Result<TransportResponse, BoxError> {
            self.requests.lock().push(request);
            Ok(TransportResponse::new(200, "{}"))
        }
    }

    fn config() -> Configuration {
        Configuration::builder()
            .app_id("20")
            .key("12345678900000001")
            .secret("12345678900000001")
            .build()
    }

    #[test]
    fn test_handle_response_mapping() {
        let ok = handle_response("/p", TransportResponse::new(200, r#"{"a":1}"#)).unwrap();
        assert_eq!(ok["a"], 1);

        let err = handle_response("/apps/20/path", TransportResponse::new(404, "")).unwrap_err();
        assert_eq!(err.to_string(), "404 Not found (/apps/20/path)");

        let err = handle_response("/p", TransportResponse::new(500, "some error\n")).unwrap_err();
        assert_eq!(err.to_string(), "Unknown error (status code 500): some error");
    }

    #[test]
    fn test_endpoint_cache_invalidated_by_update() {
        let dispatcher = Dispatcher::new(config());
        let before = dispatcher.endpoint().unwrap();
        assert_eq!(before.base_url().as_str(), "http://api.pusherapp.com/apps/20");

        dispatcher.update(|c| c.set_encrypted(true));
        let after = dispatcher.endpoint().unwrap();
        assert_eq!(after.base_url().as_str(), "https://api.pusherapp.com/apps/20");
    }

    #[tokio::test]
    async fn test_unconfigured_never_sends() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = Dispatcher::with_transport(Configuration::default(), recorder.clone());

        let err = dispatcher.send(OutboundRequest::get("/channels")).await.unwrap_err();
        assert!(err.is_configuration());

        let err = dispatcher
            .send_async(OutboundRequest::get("/channels"))
            .await
            .unwrap_err();
        assert!(err.is_configuration());

        assert!(recorder.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_send_records_signed_request() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = Dispatcher::with_transport(config(), recorder.clone());

        dispatcher.send(OutboundRequest::get("/channels")).await.unwrap();

        let requests = recorder.requests.lock();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/apps/20/channels");
        assert!(requests[0].params.contains_key("auth_signature"));
    }
}
