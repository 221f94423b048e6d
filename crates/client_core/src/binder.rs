//! Projects configuration snapshots onto controls and turns control
//! interactions into device commands.

use std::sync::Arc;

use chrono::Utc;
use shared::{
    domain::{BackgroundMode, Target},
    protocol::{Command, Configuration},
};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    bindings::{controls, label_id, BindingTable, DiscreteAction},
    device::{CommandSink, DeviceEndpoints},
};

/// The widget layer the binder reads from and writes to.
pub trait ControlSurface {
    fn set_value(&mut self, control: &str, value: &str);
    fn value(&self, control: &str) -> Option<String>;
    fn set_checked(&mut self, control: &str, checked: bool);
    fn set_label(&mut self, label: &str, text: &str);
    fn show_stream(&mut self, url: &Url);
}

/// An interaction reported by the control surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    /// In-progress slider movement.
    Input { control: String, value: String },
    /// Final value of a slider or selector.
    Commit { control: String, value: String },
    Toggle { control: String, checked: bool },
    Click { control: String },
}

impl ControlEvent {
    pub fn control(&self) -> &str {
        match self {
            ControlEvent::Input { control, .. }
            | ControlEvent::Commit { control, .. }
            | ControlEvent::Toggle { control, .. }
            | ControlEvent::Click { control } => control,
        }
    }
}

#[derive(Debug)]
pub enum EventOutcome {
    Ignored,
    Previewed,
    Dispatched {
        command: Command,
        handle: JoinHandle<()>,
    },
    StreamReloaded(Url),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderState {
    Unbound,
    Bound,
}

pub struct UiBinder<S: CommandSink + 'static> {
    bindings: BindingTable,
    sink: Arc<S>,
    endpoints: DeviceEndpoints,
    state: BinderState,
}

impl<S: CommandSink + 'static> UiBinder<S> {
    pub fn new(bindings: BindingTable, sink: Arc<S>, endpoints: DeviceEndpoints) -> Self {
        Self {
            bindings,
            sink,
            endpoints,
            state: BinderState::Unbound,
        }
    }

    pub fn state(&self) -> BinderState {
        self.state
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Starts accepting events. Returns `false` when already bound.
    pub fn bind(&mut self) -> bool {
        if self.state == BinderState::Bound {
            debug!("binder: already bound");
            return false;
        }
        self.state = BinderState::Bound;
        info!(
            sliders = self.bindings.sliders().len(),
            discrete = self.bindings.discrete_bindings().len(),
            "binder: bound"
        );
        true
    }

    /// Writes every bound control from `config`, then refreshes live-value
    /// labels from what the controls now hold. `None` leaves the surface as is.
    pub fn apply_config<V: ControlSurface + ?Sized>(
        &self,
        surface: &mut V,
        config: Option<&Configuration>,
    ) {
        let Some(config) = config else {
            debug!("binder: no configuration to project");
            return;
        };

        for binding in self.bindings.sliders() {
            let text = config
                .layer(binding.target)
                .attribute_text(binding.attribute);
            surface.set_value(binding.control, &text);
        }

        for binding in self.bindings.discrete_bindings() {
            match binding.action {
                DiscreteAction::Background => {
                    surface.set_value(binding.control, config.background.as_str())
                }
                DiscreteAction::ThermalSmooth => {
                    surface.set_value(binding.control, &config.thermal.smooth.to_string())
                }
                DiscreteAction::UsbEmboss => {
                    surface.set_checked(binding.control, config.usb_cam.emboss)
                }
                DiscreteAction::Flip { target, axis } => {
                    surface.set_checked(binding.control, config.layer(target).flip(axis))
                }
                DiscreteAction::Enable(target) => {
                    let enabled = match target {
                        Target::Thermal => config.thermal.enabled,
                        Target::Usb => config.usb_cam.enabled,
                    };
                    surface.set_checked(binding.control, enabled)
                }
                DiscreteAction::ReloadStream => {}
            }
        }

        for control in self.bindings.live_value_controls() {
            if let Some(value) = surface.value(control) {
                surface.set_label(&label_id(control), &value);
            }
        }
    }

    /// Translates one control interaction. Dispatches run on the current
    /// Tokio runtime; called outside one, a command is logged and dropped.
    pub fn handle_event<V: ControlSurface + ?Sized>(
        &self,
        surface: &mut V,
        event: ControlEvent,
    ) -> EventOutcome {
        if self.state == BinderState::Unbound {
            debug!(control = event.control(), "binder: event before bind dropped");
            return EventOutcome::Ignored;
        }

        match event {
            ControlEvent::Input { control, value } => {
                if !self.bindings.has_live_label(&control) {
                    return EventOutcome::Ignored;
                }
                surface.set_label(&label_id(&control), &value);
                EventOutcome::Previewed
            }
            ControlEvent::Commit { control, value } => match self.commit_command(&control, &value) {
                Some(command) => self.dispatch(command),
                None => EventOutcome::Ignored,
            },
            ControlEvent::Toggle { control, checked } => match self.bindings.discrete(&control) {
                Some(DiscreteAction::UsbEmboss) => self.dispatch(Command::UsbEmboss(checked)),
                Some(DiscreteAction::Flip { target, axis }) => self.dispatch(Command::Flip {
                    target,
                    axis,
                    enabled: checked,
                }),
                Some(DiscreteAction::Enable(target)) => {
                    debug!(%target, checked, "binder: source enable has no device command");
                    EventOutcome::Ignored
                }
                _ => EventOutcome::Ignored,
            },
            ControlEvent::Click { control } => {
                if self.bindings.discrete(&control) != Some(DiscreteAction::ReloadStream) {
                    return EventOutcome::Ignored;
                }
                let url = self.endpoints.stream_url(Utc::now().timestamp_millis());
                surface.show_stream(&url);
                debug!(%url, "binder: stream reloaded");
                EventOutcome::StreamReloaded(url)
            }
        }
    }

    fn commit_command(&self, control: &str, value: &str) -> Option<Command> {
        let value = value.trim();
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            debug!(control, value, "binder: committed value is not a single token");
            return None;
        }

        if let Some(binding) = self.bindings.slider(control) {
            return Some(Command::set(binding.target, binding.attribute, value));
        }

        match self.bindings.discrete(control)? {
            DiscreteAction::Background => Some(Command::Background(BackgroundMode::new(value))),
            DiscreteAction::ThermalSmooth => match value.parse::<i64>() {
                Ok(level) => Some(Command::ThermalSmooth(level)),
                Err(_) => {
                    debug!(
                        control = controls::THERMAL_SMOOTH,
                        value, "binder: smoothing level is not an integer"
                    );
                    None
                }
            },
            _ => None,
        }
    }

    /// Sends `command` in the background. The outcome is logged and otherwise
    /// intentionally discarded.
    fn dispatch(&self, command: Command) -> EventOutcome {
        let Ok(runtime) = Handle::try_current() else {
            warn!(command = %command, "binder: no tokio runtime, command dropped");
            return EventOutcome::Ignored;
        };
        debug!(command = %command, "binder: dispatching");
        let sink = Arc::clone(&self.sink);
        let line = command.clone();
        let handle = runtime.spawn(async move {
            if let Err(err) = sink.dispatch(&line).await {
                warn!(command = %line, error = %err, "binder: command dispatch failed");
            }
        });
        EventOutcome::Dispatched { command, handle }
    }
}

#[cfg(test)]
#[path = "tests/binder_tests.rs"]
mod tests;
