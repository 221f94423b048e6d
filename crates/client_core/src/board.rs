use std::collections::BTreeMap;

use url::Url;

use crate::binder::{ControlEvent, ControlSurface};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    pub value: Option<String>,
    pub checked: Option<bool>,
}

/// In-memory control surface used by the terminal front end and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlBoard {
    controls: BTreeMap<String, ControlState>,
    labels: BTreeMap<String, String>,
    stream: Option<Url>,
}

impl ControlBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn control(&self, control: &str) -> Option<&ControlState> {
        self.controls.get(control)
    }

    pub fn checked(&self, control: &str) -> Option<bool> {
        self.controls.get(control)?.checked
    }

    pub fn label(&self, label: &str) -> Option<&str> {
        self.labels.get(label).map(String::as_str)
    }

    pub fn stream(&self) -> Option<&Url> {
        self.stream.as_ref()
    }

    pub fn controls(&self) -> impl Iterator<Item = (&str, &ControlState)> {
        self.controls.iter().map(|(id, state)| (id.as_str(), state))
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels
            .iter()
            .map(|(id, text)| (id.as_str(), text.as_str()))
    }

    /// Records what an operator did to a control before the event is handed
    /// to the binder, the way a browser updates an input before firing events.
    pub fn record_user_event(&mut self, event: &ControlEvent) {
        match event {
            ControlEvent::Input { control, value } | ControlEvent::Commit { control, value } => {
                self.set_value(control, value)
            }
            ControlEvent::Toggle { control, checked } => self.set_checked(control, *checked),
            ControlEvent::Click { .. } => {}
        }
    }
}

impl ControlSurface for ControlBoard {
    fn set_value(&mut self, control: &str, value: &str) {
        self.controls.entry(control.to_string()).or_default().value = Some(value.to_string());
    }

    fn value(&self, control: &str) -> Option<String> {
        self.controls.get(control)?.value.clone()
    }

    fn set_checked(&mut self, control: &str, checked: bool) {
        self.controls.entry(control.to_string()).or_default().checked = Some(checked);
    }

    fn set_label(&mut self, label: &str, text: &str) {
        self.labels.insert(label.to_string(), text.to_string());
    }

    fn show_stream(&mut self, url: &Url) {
        self.stream = Some(url.clone());
    }
}
