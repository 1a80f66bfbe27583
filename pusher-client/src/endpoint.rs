//! Request target construction.

use crate::{Configuration, PusherError, Result};
use url::Url;

/// Fully resolved base URL of one app, `{scheme}://{host}:{port}/apps/{app_id}`.
///
/// Immutable once built. Build a new one whenever the configuration changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
    app_path: String,
}

impl Endpoint {
    /// Build the endpoint for a configuration.
    pub fn build(config: &Configuration) -> Result<Self> {
        config.ensure_configured()?;

        // ensure_configured guarantees these are present.
        let host = config.host.as_deref().unwrap_or_default();
        let port = config.port.unwrap_or_else(|| config.scheme.default_port());
        let app_id = config.app_id.as_deref().unwrap_or_default();

        let app_path = format!("/apps/{}", app_id);
        let mut base = Url::parse(&format!("{}://{}", config.scheme, host))?;
        base.set_port(Some(port))
            .map_err(|_| PusherError::InvalidUri(url::ParseError::InvalidPort))?;
        base.set_path(&app_path);

        Ok(Self { base, app_path })
    }

    /// The base URL, ending in `/apps/{app_id}`.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Absolute request path for a resource, e.g. `/events` becomes
    /// `/apps/{app_id}/events`. This is the path that gets signed.
    pub fn path_for(&self, resource: &str) -> String {
        let resource = resource.trim_start_matches('/');
        if resource.is_empty() {
            self.app_path.clone()
        } else {
            format!("{}/{}", self.app_path, resource)
        }
    }

    /// URL for a resource, without query string.
    pub fn url_for(&self, resource: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(&self.path_for(resource));
        url
    }
}
