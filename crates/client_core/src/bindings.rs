//! Static mapping from control identifiers to what the device should be told.

use std::collections::HashMap;

use shared::domain::{Attribute, FlipAxis, Target};

use crate::error::BindingError;

pub mod controls {
    pub const BG_MODE: &str = "bg_mode";
    pub const BTN_RELOAD: &str = "btn_reload";

    pub const THERMAL_ENABLED: &str = "thermal_enabled";
    pub const THERMAL_SMOOTH: &str = "thermal_smooth";
    pub const TH_OFFX: &str = "th_offx";
    pub const TH_OFFY: &str = "th_offy";
    pub const TH_SCALE: &str = "th_scale";
    pub const TH_OPACITY: &str = "th_opacity";
    pub const TH_ROT: &str = "th_rot";
    pub const TH_FLIP_H: &str = "th_flip_h";
    pub const TH_FLIP_V: &str = "th_flip_v";

    pub const CAM_ENABLED: &str = "cam_enabled";
    pub const CAM_EMBOSS: &str = "cam_emboss";
    pub const CAM_OFFX: &str = "cam_offx";
    pub const CAM_OFFY: &str = "cam_offy";
    pub const CAM_SCALE: &str = "cam_scale";
    pub const CAM_OPACITY: &str = "cam_opacity";
    pub const CAM_ROT: &str = "cam_rot";
    pub const CAM_FLIP_H: &str = "cam_flip_h";
    pub const CAM_FLIP_V: &str = "cam_flip_v";
}

use controls::*;

/// A slider whose committed value becomes `set <target> <attribute> <value>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderBinding {
    pub control: &'static str,
    pub target: Target,
    pub attribute: Attribute,
}

/// Controls outside the generic slider table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscreteAction {
    Background,
    ThermalSmooth,
    UsbEmboss,
    Flip { target: Target, axis: FlipAxis },
    /// Projected from the config but the firmware has no command for it.
    Enable(Target),
    ReloadStream,
}

impl DiscreteAction {
    /// Whether the control renders a `<id>_val` label next to it.
    pub fn has_live_label(self) -> bool {
        matches!(self, DiscreteAction::ThermalSmooth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscreteBinding {
    pub control: &'static str,
    pub action: DiscreteAction,
}

const fn slider(control: &'static str, target: Target, attribute: Attribute) -> SliderBinding {
    SliderBinding {
        control,
        target,
        attribute,
    }
}

const fn discrete(control: &'static str, action: DiscreteAction) -> DiscreteBinding {
    DiscreteBinding { control, action }
}

pub const SLIDER_BINDINGS: &[SliderBinding] = &[
    slider(TH_OFFX, Target::Thermal, Attribute::OffsetX),
    slider(TH_OFFY, Target::Thermal, Attribute::OffsetY),
    slider(TH_SCALE, Target::Thermal, Attribute::Scale),
    slider(TH_OPACITY, Target::Thermal, Attribute::Opacity),
    slider(TH_ROT, Target::Thermal, Attribute::Rotate),
    slider(CAM_OFFX, Target::Usb, Attribute::OffsetX),
    slider(CAM_OFFY, Target::Usb, Attribute::OffsetY),
    slider(CAM_SCALE, Target::Usb, Attribute::Scale),
    slider(CAM_OPACITY, Target::Usb, Attribute::Opacity),
    slider(CAM_ROT, Target::Usb, Attribute::Rotate),
];

pub const DISCRETE_BINDINGS: &[DiscreteBinding] = &[
    discrete(BG_MODE, DiscreteAction::Background),
    discrete(THERMAL_ENABLED, DiscreteAction::Enable(Target::Thermal)),
    discrete(THERMAL_SMOOTH, DiscreteAction::ThermalSmooth),
    discrete(
        TH_FLIP_H,
        DiscreteAction::Flip {
            target: Target::Thermal,
            axis: FlipAxis::Horizontal,
        },
    ),
    discrete(
        TH_FLIP_V,
        DiscreteAction::Flip {
            target: Target::Thermal,
            axis: FlipAxis::Vertical,
        },
    ),
    discrete(CAM_ENABLED, DiscreteAction::Enable(Target::Usb)),
    discrete(CAM_EMBOSS, DiscreteAction::UsbEmboss),
    discrete(
        CAM_FLIP_H,
        DiscreteAction::Flip {
            target: Target::Usb,
            axis: FlipAxis::Horizontal,
        },
    ),
    discrete(
        CAM_FLIP_V,
        DiscreteAction::Flip {
            target: Target::Usb,
            axis: FlipAxis::Vertical,
        },
    ),
    discrete(BTN_RELOAD, DiscreteAction::ReloadStream),
];

/// Id of the live-value label rendered next to a slider-class control.
pub fn label_id(control: &str) -> String {
    format!("{control}_val")
}

/// Validated lookup over the slider and discrete tables.
#[derive(Debug, Clone)]
pub struct BindingTable {
    sliders: Vec<SliderBinding>,
    discrete: Vec<DiscreteBinding>,
    index: HashMap<&'static str, Entry>,
}

#[derive(Debug, Clone, Copy)]
enum Entry {
    Slider(usize),
    Discrete(usize),
}

impl BindingTable {
    /// Builds the table, rejecting empty, whitespace-bearing and duplicate ids.
    pub fn new(
        sliders: &[SliderBinding],
        discrete: &[DiscreteBinding],
    ) -> Result<Self, BindingError> {
        let mut index = HashMap::with_capacity(sliders.len() + discrete.len());

        let ids = sliders
            .iter()
            .enumerate()
            .map(|(pos, b)| (b.control, Entry::Slider(pos)))
            .chain(
                discrete
                    .iter()
                    .enumerate()
                    .map(|(pos, b)| (b.control, Entry::Discrete(pos))),
            );
        for (control, entry) in ids {
            if control.is_empty() {
                return Err(BindingError::EmptyId);
            }
            if control.chars().any(char::is_whitespace) {
                return Err(BindingError::MalformedId(control.to_string()));
            }
            if index.insert(control, entry).is_some() {
                return Err(BindingError::Duplicate(control.to_string()));
            }
        }

        Ok(Self {
            sliders: sliders.to_vec(),
            discrete: discrete.to_vec(),
            index,
        })
    }

    pub fn standard() -> Result<Self, BindingError> {
        Self::new(SLIDER_BINDINGS, DISCRETE_BINDINGS)
    }

    pub fn slider(&self, control: &str) -> Option<&SliderBinding> {
        match self.index.get(control)? {
            Entry::Slider(pos) => self.sliders.get(*pos),
            Entry::Discrete(_) => None,
        }
    }

    pub fn discrete(&self, control: &str) -> Option<DiscreteAction> {
        match self.index.get(control)? {
            Entry::Discrete(pos) => self.discrete.get(*pos).map(|b| b.action),
            Entry::Slider(_) => None,
        }
    }

    pub fn sliders(&self) -> &[SliderBinding] {
        &self.sliders
    }

    pub fn discrete_bindings(&self) -> &[DiscreteBinding] {
        &self.discrete
    }

    /// Every control that carries a live-value label, in table order.
    pub fn live_value_controls(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sliders.iter().map(|b| b.control).chain(
            self.discrete
                .iter()
                .filter(|b| b.action.has_live_label())
                .map(|b| b.control),
        )
    }

    pub fn has_live_label(&self, control: &str) -> bool {
        match self.index.get(control) {
            Some(Entry::Slider(_)) => true,
            Some(Entry::Discrete(pos)) => self.discrete[*pos].action.has_live_label(),
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "tests/bindings_tests.rs"]
mod tests;
