use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "panel.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub device_url: String,
    pub request_timeout_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_url: "http://127.0.0.1:8080".into(),
            request_timeout_ms: None,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    device_url: Option<String>,
    request_timeout_ms: Option<u64>,
}

/// Defaults, then the settings file, then the process environment.
///
/// An explicitly named file must exist; the default `panel.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let raw = match path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };
    if let Some(raw) = raw {
        merge_file(&mut settings, &raw)?;
    }

    merge_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn merge_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw).context("invalid settings file")?;
    if let Some(v) = file.device_url {
        settings.device_url = v;
    }
    if let Some(v) = file.request_timeout_ms {
        settings.request_timeout_ms = Some(v);
    }
    Ok(())
}

fn merge_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("PANEL_DEVICE_URL") {
        settings.device_url = v;
    }
    if let Some(v) = lookup("APP__DEVICE_URL") {
        settings.device_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_MS") {
        let parsed = v
            .trim()
            .parse::<u64>()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_MS is not a number: '{v}'"))?;
        settings.request_timeout_ms = Some(parsed);
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
