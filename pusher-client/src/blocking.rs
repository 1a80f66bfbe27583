//! Blocking facade over [`Client`].
//!
//! Each call parks the calling thread until the API answers. Signing and
//! error mapping are exactly those of the async client.
//!
//! # Panics
//!
//! Calls panic when made from inside an async runtime, as with any
//! `block_on`. Use [`Client`] directly there.

use crate::{Channels, Client, Configuration, Response, Result, TriggerOptions};
use serde::Serialize;
use tokio::runtime::{Builder, Runtime};

/// A [`Client`] that blocks instead of returning futures.
pub struct BlockingClient {
    client: Client,
    runtime: Runtime,
}

impl BlockingClient {
    /// Wrap an existing client.
    pub fn new(client: Client) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { client, runtime })
    }

    /// Create a blocking client for a configuration.
    pub fn from_config(config: Configuration) -> Result<Self> {
        Self::new(Client::new(config))
    }

    /// The wrapped async client, sharing configuration and channels.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Publish an event and wait for the API to accept it.
    pub fn trigger<T: Serialize + ?Sized>(
        &self,
        channels: impl Into<Channels>,
        event: &str,
        payload: &T,
        options: &TriggerOptions,
    ) -> Result<Response> {
        self.runtime
            .block_on(self.client.trigger(channels, event, payload, options))
    }

    /// Publish an event to the channel called `name`.
    pub fn trigger_on<T: Serialize + ?Sized>(
        &self,
        name: &str,
        event: &str,
        payload: &T,
        options: &TriggerOptions,
    ) -> Result<Response> {
        let channel = self.client.channel(name)?;
        self.runtime.block_on(channel.trigger(event, payload, options))
    }

    /// List occupied channels.
    pub fn channels<I, K, V>(&self, params: I) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.runtime.block_on(self.client.channels(params))
    }

    /// Fetch one channel's state.
    pub fn channel_info<I, K, V>(&self, name: &str, params: I) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.runtime.block_on(self.client.channel_info(name, params))
    }

    /// Signed GET of a resource relative to `/apps/{app_id}`.
    pub fn get<I, K, V>(&self, resource: &str, params: I) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.runtime.block_on(self.client.get(resource, params))
    }

    /// Signed POST of a JSON body to a resource relative to `/apps/{app_id}`.
    pub fn post<T: Serialize + ?Sized>(&self, resource: &str, body: &T) -> Result<Response> {
        self.runtime.block_on(self.client.post(resource, body))
    }
}

impl std::fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingClient")
            .field("client", &self.client)
            .finish()
    }
}
