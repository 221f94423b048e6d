//! Text form of control events for the interactive session.

use anyhow::{anyhow, bail, Result};
use client_core::ControlEvent;

/// Parses `input|commit <control> <value>`, `toggle <control> <on|off>` or
/// `click <control>`.
pub fn parse_event_line(line: &str) -> Result<ControlEvent> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["input", control, value] => Ok(ControlEvent::Input {
            control: control.to_string(),
            value: value.to_string(),
        }),
        ["commit", control, value] => Ok(ControlEvent::Commit {
            control: control.to_string(),
            value: value.to_string(),
        }),
        ["toggle", control, state] => Ok(ControlEvent::Toggle {
            control: control.to_string(),
            checked: parse_switch(state)?,
        }),
        ["click", control] => Ok(ControlEvent::Click {
            control: control.to_string(),
        }),
        [] => bail!("empty event line"),
        [verb, ..] => bail!("unrecognized event `{verb}` (expected input, commit, toggle or click)"),
    }
}

pub fn parse_switch(state: &str) -> Result<bool> {
    match state.to_ascii_lowercase().as_str() {
        "on" | "1" | "true" | "checked" => Ok(true),
        "off" | "0" | "false" | "unchecked" => Ok(false),
        other => Err(anyhow!("expected on/off, got `{other}`")),
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
