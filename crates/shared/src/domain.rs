use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::CommandParseError;

macro_rules! wire_token {
    ($name:ident, $kind:literal { $($variant:ident => $token:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CommandParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok($name::$variant),)+
                    other => Err(CommandParseError::UnknownToken {
                        kind: $kind,
                        token: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Overlay source a command is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Thermal,
    Usb,
}

wire_token!(Target, "target" {
    Thermal => "thermal",
    Usb => "usb",
});

impl Target {
    /// Accepts the source aliases the firmware understands.
    pub fn parse_alias(s: &str) -> Result<Self, CommandParseError> {
        match s.to_ascii_lowercase().as_str() {
            "camera" | "usb_cam" | "usb" => Ok(Target::Usb),
            "thermal" => Ok(Target::Thermal),
            other => Err(CommandParseError::UnknownToken {
                kind: "target",
                token: other.to_string(),
            }),
        }
    }
}

/// Numeric layer attribute adjustable through `set <target> <attribute> <value>`.
///
/// `Rotate` is stored as `rotate` in the configuration document but travels as
/// `rotate_deg` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    OffsetX,
    OffsetY,
    Scale,
    Opacity,
    Rotate,
}

wire_token!(Attribute, "attribute" {
    OffsetX => "offset_x",
    OffsetY => "offset_y",
    Scale => "scale",
    Opacity => "opacity",
    Rotate => "rotate_deg",
});

impl Attribute {
    /// Field name inside the configuration document.
    pub fn config_field(self) -> &'static str {
        match self {
            Attribute::Rotate => "rotate",
            other => other.as_str(),
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Attribute::OffsetX | Attribute::OffsetY | Attribute::Rotate
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

wire_token!(FlipAxis, "flip axis" {
    Horizontal => "flip_h",
    Vertical => "flip_v",
});

/// Compositor background mode, identified by the string the device reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackgroundMode(pub String);

impl BackgroundMode {
    pub const BLACK: &'static str = "black";
    pub const GREY: &'static str = "grey";

    pub fn new(mode: impl Into<String>) -> Self {
        Self(mode.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the current firmware recognises this mode.
    pub fn is_known(&self) -> bool {
        matches!(self.0.as_str(), Self::BLACK | Self::GREY)
    }
}

impl Default for BackgroundMode {
    fn default() -> Self {
        Self::new(Self::BLACK)
    }
}

impl fmt::Display for BackgroundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
