use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Attribute, BackgroundMode, FlipAxis, Target},
    error::{CommandParseError, ValidationError},
};

/// Placement and appearance of one overlay source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerTransform {
    pub offset_x: i32,
    pub offset_y: i32,
    pub scale: f64,
    pub opacity: f64,
    pub rotate: i32,
    #[serde(default)]
    pub flip_h: bool,
    #[serde(default)]
    pub flip_v: bool,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            offset_x: 0,
            offset_y: 0,
            scale: 1.0,
            opacity: 1.0,
            rotate: 0,
            flip_h: false,
            flip_v: false,
        }
    }
}

impl LayerTransform {
    /// Renders an attribute the way a control displays it.
    pub fn attribute_text(&self, attribute: Attribute) -> String {
        match attribute {
            Attribute::OffsetX => self.offset_x.to_string(),
            Attribute::OffsetY => self.offset_y.to_string(),
            Attribute::Scale => format_number(self.scale),
            Attribute::Opacity => format_number(self.opacity),
            Attribute::Rotate => self.rotate.to_string(),
        }
    }

    pub fn flip(&self, axis: FlipAxis) -> bool {
        match axis {
            FlipAxis::Horizontal => self.flip_h,
            FlipAxis::Vertical => self.flip_v,
        }
    }

    /// Values outside the ranges the controls expose. The device stores
    /// whatever it was told, so these are reported, not rejected.
    fn range_issues(&self, source_name: &'static str, issues: &mut Vec<ValidationError>) {
        if !(0.0..=1.0).contains(&self.opacity) {
            issues.push(ValidationError::OpacityOutOfRange {
                source_name,
                value: self.opacity,
            });
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            issues.push(ValidationError::InvalidScale {
                source_name,
                value: self.scale,
            });
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalConfig {
    pub enabled: bool,
    pub smooth: i64,
    #[serde(flatten)]
    pub transform: LayerTransform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsbCamConfig {
    pub enabled: bool,
    pub emboss: bool,
    #[serde(flatten)]
    pub transform: LayerTransform,
    #[serde(default = "default_capture_device")]
    pub device: String,
    #[serde(default = "default_capture_width")]
    pub width: u32,
    #[serde(default = "default_capture_height")]
    pub height: u32,
    #[serde(default = "default_capture_fps")]
    pub fps: u32,
}

fn default_capture_device() -> String {
    "/dev/video0".to_string()
}

fn default_capture_width() -> u32 {
    640
}

fn default_capture_height() -> u32 {
    480
}

fn default_capture_fps() -> u32 {
    15
}

/// Snapshot of the compositor settings as served by `GET /api/config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub background: BackgroundMode,
    pub thermal: ThermalConfig,
    pub usb_cam: UsbCamConfig,
}

impl Configuration {
    pub fn layer(&self, target: Target) -> &LayerTransform {
        match target {
            Target::Thermal => &self.thermal.transform,
            Target::Usb => &self.usb_cam.transform,
        }
    }

    /// Rejects documents that cannot be projected or echoed back as commands.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mode = self.background.as_str();
        if mode.is_empty() || mode.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidBackground(mode.to_string()));
        }
        Ok(())
    }

    /// Layer values outside their control ranges, e.g. an opacity of `1.5`
    /// committed earlier and stored verbatim by the device.
    pub fn range_issues(&self) -> Vec<ValidationError> {
        let mut issues = Vec::new();
        self.thermal.transform.range_issues("thermal", &mut issues);
        self.usb_cam.transform.range_issues("usb_cam", &mut issues);
        issues
    }
}

/// One line of the device command protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set {
        target: Target,
        attribute: Attribute,
        value: String,
    },
    Flip {
        target: Target,
        axis: FlipAxis,
        enabled: bool,
    },
    Background(BackgroundMode),
    ThermalSmooth(i64),
    UsbEmboss(bool),
}

impl Command {
    pub fn set(target: Target, attribute: Attribute, value: impl Into<String>) -> Self {
        Command::Set {
            target,
            attribute,
            value: value.into(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Set {
                target,
                attribute,
                value,
            } => write!(f, "set {target} {attribute} {value}"),
            Command::Flip {
                target,
                axis,
                enabled,
            } => write!(f, "set {target} {axis} {}", bool_digit(*enabled)),
            Command::Background(mode) => write!(f, "bg {mode}"),
            Command::ThermalSmooth(level) => write!(f, "set thermal smooth {level}"),
            Command::UsbEmboss(enabled) => write!(f, "set usb emboss {}", bool_digit(*enabled)),
        }
    }
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((verb, args)) = tokens.split_first() else {
            return Err(CommandParseError::Empty);
        };

        match verb.to_ascii_lowercase().as_str() {
            "bg" => {
                let [mode] = args else {
                    return Err(CommandParseError::Arity {
                        verb: "bg",
                        expected: 1,
                        actual: args.len(),
                    });
                };
                Ok(Command::Background(BackgroundMode::new(
                    mode.to_ascii_lowercase(),
                )))
            }
            "set" => {
                let [target, key, value] = args else {
                    return Err(CommandParseError::Arity {
                        verb: "set",
                        expected: 3,
                        actual: args.len(),
                    });
                };
                parse_set(Target::parse_alias(target)?, &key.to_ascii_lowercase(), value)
            }
            other => Err(CommandParseError::UnknownVerb(other.to_string())),
        }
    }
}

fn parse_set(target: Target, key: &str, value: &str) -> Result<Command, CommandParseError> {
    match key {
        "smooth" if target == Target::Thermal => value
            .parse::<i64>()
            .map(Command::ThermalSmooth)
            .map_err(|_| invalid("smooth", value)),
        "emboss" if target == Target::Usb => parse_bool(value)
            .map(Command::UsbEmboss)
            .ok_or_else(|| invalid("emboss", value)),
        "flip_h" | "flip_v" => {
            let axis = key.parse::<FlipAxis>()?;
            let enabled = parse_bool(value).ok_or_else(|| invalid(axis.as_str(), value))?;
            Ok(Command::Flip {
                target,
                axis,
                enabled,
            })
        }
        _ => {
            let attribute = key.parse::<Attribute>()?;
            let numeric = if attribute.is_integral() {
                value.parse::<i64>().is_ok()
            } else {
                value.parse::<f64>().map(f64::is_finite).unwrap_or(false)
            };
            if !numeric {
                return Err(invalid(attribute.as_str(), value));
            }
            Ok(Command::set(target, attribute, value.to_string()))
        }
    }
}

fn invalid(field: &'static str, value: &str) -> CommandParseError {
    CommandParseError::InvalidValue {
        field,
        value: value.to_string(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}

fn bool_digit(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Shortest decimal form, so `1.0` renders as `1` and `0.8` as `0.8`.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
