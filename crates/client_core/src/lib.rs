use std::{sync::Arc, time::Duration};

use shared::protocol::Configuration;
use tracing::{info, warn};

pub mod binder;
pub mod bindings;
mod board;
pub mod device;
pub mod error;
mod store;

pub use binder::{BinderState, ControlEvent, ControlSurface, EventOutcome, UiBinder};
pub use bindings::BindingTable;
pub use board::{ControlBoard, ControlState};
pub use device::{build_http_client, CommandSink, DeviceClient, DeviceEndpoints};
pub use error::{BindingError, DispatchError, FetchError, PanelError};
pub use store::{ConfigStore, StoreState};

/// Wires a [`ConfigStore`] to a [`UiBinder`] for one operator session.
pub struct ControlPanel<S: CommandSink + 'static> {
    store: ConfigStore,
    binder: UiBinder<S>,
}

impl ControlPanel<DeviceClient> {
    /// Panel talking to the device at `device_url` over HTTP.
    pub fn connect(device_url: &str, timeout: Option<Duration>) -> Result<Self, PanelError> {
        let endpoints = DeviceEndpoints::new(device_url)?;
        let http = build_http_client(timeout)?;
        let bindings = BindingTable::standard()?;
        let device = Arc::new(DeviceClient::new(http.clone(), endpoints.clone()));
        Ok(Self::new(
            ConfigStore::new(http, endpoints.clone()),
            UiBinder::new(bindings, device, endpoints),
        ))
    }
}

impl<S: CommandSink + 'static> ControlPanel<S> {
    pub fn new(store: ConfigStore, binder: UiBinder<S>) -> Self {
        Self { store, binder }
    }

    /// Binds event handling, then fetches the configuration once and projects
    /// it. On a failed fetch the surface stays unpopulated and the panel keeps
    /// accepting events; the error is returned for reporting only.
    pub async fn start<V: ControlSurface + ?Sized>(
        &mut self,
        surface: &mut V,
    ) -> Result<(), FetchError> {
        self.binder.bind();
        match self.store.fetch_config().await {
            Ok(config) => {
                self.binder.apply_config(surface, Some(config));
                info!("panel: initialized");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "panel: config fetch failed; controls left unpopulated");
                Err(err)
            }
        }
    }

    pub fn handle_event<V: ControlSurface + ?Sized>(
        &self,
        surface: &mut V,
        event: ControlEvent,
    ) -> EventOutcome {
        self.binder.handle_event(surface, event)
    }

    pub fn current_config(&self) -> Option<&Configuration> {
        self.store.current_config()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn binder(&self) -> &UiBinder<S> {
        &self.binder
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
