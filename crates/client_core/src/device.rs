use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::Command;
use tracing::debug;
use url::Url;

use crate::error::DispatchError;

const CONFIG_PATH: &str = "api/config";
const COMMAND_PATH: &str = "api/cmd";
const STREAM_PATH: &str = "mjpeg";

/// URLs of the three device resources, derived from one base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoints {
    base: Url,
}

impl DeviceEndpoints {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn config_url(&self) -> Url {
        self.resource(CONFIG_PATH)
    }

    /// `api/cmd?line=<command>` with the line percent-encoded (spaces as `%20`).
    pub fn command_url(&self, command: &Command) -> Url {
        let mut url = self.resource(COMMAND_PATH);
        let line = command.to_string();
        url.set_query(Some(&format!("line={}", urlencoding::encode(&line))));
        url
    }

    /// Stream URL made unique by `ts` so caches never replay an old feed.
    pub fn stream_url(&self, ts: i64) -> Url {
        let mut url = self.resource(STREAM_PATH);
        url.set_query(Some(&format!("ts={ts}")));
        url
    }

    fn resource(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let joined = format!("{}{path}", self.base.path());
        url.set_path(&joined);
        url
    }
}

/// Destination for command lines produced by control interactions.
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn dispatch(&self, command: &Command) -> Result<(), DispatchError>;
}

/// Sends command lines to the device's command endpoint.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: Client,
    endpoints: DeviceEndpoints,
}

impl DeviceClient {
    pub fn new(http: Client, endpoints: DeviceEndpoints) -> Self {
        Self { http, endpoints }
    }

    pub fn endpoints(&self) -> &DeviceEndpoints {
        &self.endpoints
    }

    pub fn http(&self) -> &Client {
        &self.http
    }
}

#[async_trait]
impl CommandSink for DeviceClient {
    async fn dispatch(&self, command: &Command) -> Result<(), DispatchError> {
        let url = self.endpoints.command_url(command);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(DispatchError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status));
        }
        debug!(command = %command, %status, "device: command accepted by transport");
        Ok(())
    }
}

/// HTTP client for talking to the device. `None` keeps reqwest's default of no
/// request timeout.
pub fn build_http_client(timeout: Option<Duration>) -> reqwest::Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

#[cfg(test)]
#[path = "tests/device_tests.rs"]
mod tests;
