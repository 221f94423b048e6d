use reqwest::Client;
use shared::protocol::Configuration;
use tracing::{debug, info, warn};

use crate::{device::DeviceEndpoints, error::FetchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Unfetched,
    Loaded,
}

/// Holds the last configuration snapshot read from the device.
///
/// The store knows nothing about controls. A failed fetch leaves the previous
/// state in place; nothing is retried.
#[derive(Debug)]
pub struct ConfigStore {
    http: Client,
    endpoints: DeviceEndpoints,
    snapshot: Option<Configuration>,
}

impl ConfigStore {
    pub fn new(http: Client, endpoints: DeviceEndpoints) -> Self {
        Self {
            http,
            endpoints,
            snapshot: None,
        }
    }

    /// One `GET /api/config`, decoded and validated before it replaces the
    /// stored snapshot. Out-of-range layer values are logged and kept, since
    /// the device serves back whatever was last committed.
    pub async fn fetch_config(&mut self) -> Result<&Configuration, FetchError> {
        let url = self.endpoints.config_url();
        debug!(%url, "config: fetching snapshot");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(FetchError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await.map_err(FetchError::Transport)?;
        let config: Configuration = serde_json::from_slice(&body)?;
        config.validate()?;
        for issue in config.range_issues() {
            warn!(%issue, "config: snapshot value outside control range");
        }

        info!(
            background = %config.background,
            thermal_enabled = config.thermal.enabled,
            usb_enabled = config.usb_cam.enabled,
            "config: snapshot loaded"
        );
        Ok(self.snapshot.insert(config))
    }

    pub fn current_config(&self) -> Option<&Configuration> {
        self.snapshot.as_ref()
    }

    pub fn state(&self) -> StoreState {
        if self.snapshot.is_some() {
            StoreState::Loaded
        } else {
            StoreState::Unfetched
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
