//! Channels and event triggering.

use crate::{Dispatcher, OutboundRequest, PendingRequest, PusherError, Response, Result};
use parking_lot::Mutex;
use pusher_log::debug;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of channels a single trigger may target.
pub const MAX_TRIGGER_CHANNELS: usize = 10;

/// One or more channel names targeted by a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channels(Vec<String>);

impl Channels {
    /// Channel names in the order given.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no channel is targeted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Channels {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for Channels {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<&String> for Channels {
    fn from(name: &String) -> Self {
        Self(vec![name.clone()])
    }
}

impl From<Vec<String>> for Channels {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for Channels {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[String]> for Channels {
    fn from(names: &[String]) -> Self {
        Self(names.to_vec())
    }
}

impl From<&[&str]> for Channels {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Channels {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

/// Optional trigger parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerOptions {
    /// Connection to exclude from receiving the event.
    pub socket_id: Option<String>,
}

impl TriggerOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude the connection with this socket id.
    pub fn socket_id(mut self, socket_id: impl Into<String>) -> Self {
        self.socket_id = Some(socket_id.into());
        self
    }
}

#[derive(Serialize)]
struct TriggerBody<'a> {
    name: &'a str,
    channels: &'a [String],
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    socket_id: Option<&'a str>,
}

/// Encode an event payload for the `data` field.
///
/// Strings pass through unchanged; anything else is serialized to JSON.
pub fn encode_payload<T: Serialize + ?Sized>(payload: &T) -> Result<String> {
    match serde_json::to_value(payload)? {
        Value::String(s) => Ok(s),
        _ => Ok(serde_json::to_string(payload)?),
    }
}

/// Build the `POST /events` request for a trigger.
///
/// Fails before anything is sent when the channel list is empty or longer
/// than [`MAX_TRIGGER_CHANNELS`].
pub fn trigger_request<T: Serialize + ?Sized>(
    channels: &Channels,
    event: &str,
    payload: &T,
    options: &TriggerOptions,
) -> Result<OutboundRequest> {
    if channels.is_empty() {
        return Err(PusherError::request("At least one channel is required"));
    }
    if channels.len() > MAX_TRIGGER_CHANNELS {
        return Err(PusherError::request(format!(
            "Too many channels ({}), a trigger may target at most {}",
            channels.len(),
            MAX_TRIGGER_CHANNELS
        )));
    }

    let body = TriggerBody {
        name: event,
        channels: channels.names(),
        data: encode_payload(payload)?,
        socket_id: options.socket_id.as_deref(),
    };

    Ok(OutboundRequest::post("/events").body(serde_json::to_vec(&body)?))
}

/// A named channel of one app.
///
/// Obtained through [`Client::channel`](crate::Client::channel), which hands
/// out the same instance for the same name.
pub struct Channel {
    name: String,
    dispatcher: Arc<Dispatcher>,
}

impl Channel {
    pub(crate) fn new(name: impl Into<String>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            name: name.into(),
            dispatcher,
        }
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Publish an event to this channel and wait for the API to accept it.
    pub async fn trigger<T: Serialize + ?Sized>(
        &self,
        event: &str,
        payload: &T,
        options: &TriggerOptions,
    ) -> Result<Response> {
        let request = trigger_request(&Channels::from(&self.name), event, payload, options)?;
        self.dispatcher.send(request).await
    }

    /// Publish an event to this channel without waiting.
    pub fn trigger_async<T: Serialize + ?Sized>(
        &self,
        event: &str,
        payload: &T,
        options: &TriggerOptions,
    ) -> PendingRequest {
        match trigger_request(&Channels::from(&self.name), event, payload, options) {
            Ok(request) => self.dispatcher.send_async(request),
            Err(err) => PendingRequest::ready(Err(err)),
        }
    }

    /// Fetch channel state, `GET /channels/{name}`.
    pub async fn info<I, K, V>(&self, params: I) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let request = OutboundRequest::get(format!("/channels/{}", self.name)).queries(params);
        self.dispatcher.send(request).await
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel").field("name", &self.name).finish()
    }
}

/// Memoizes one [`Channel`] per name.
#[derive(Default)]
pub(crate) struct ChannelRegistry {
    channels: Mutex<HashMap<String, Arc<Channel>>>,
}

impl ChannelRegistry {
    /// Return the channel for `name`, creating it on first request.
    pub(crate) fn get_or_create(&self, name: &str, dispatcher: &Arc<Dispatcher>) -> Arc<Channel> {
        let mut channels = self.channels.lock();
        channels
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(target: "pusher::channel", "Creating channel {}", name);
                Arc::new(Channel::new(name, dispatcher.clone()))
            })
            .clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.channels.lock().len()
    }
}
