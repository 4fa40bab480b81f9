//! Keyboard command vocabulary.
//!
//! Keys arrive as key-symbol names (`"Right"`, `"1"`, `"v"`, ...). Each
//! variant of the viewer understands its own fixed set of names; anything
//! else maps to no command.

use isoscope_core::{Anchor, ModeCommand, OpacityAdjustment, Variant};

/// Direction of an incremental edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    /// Applies the direction to a positive step.
    #[must_use]
    pub fn signed(self, step: f32) -> f32 {
        match self {
            Direction::Increase => step,
            Direction::Decrease => -step,
        }
    }
}

/// A recognized keyboard command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Grow or shrink the volume sample step size.
    StepSize(Direction),
    /// Edit transfer function opacity.
    Opacity(OpacityAdjustment, Direction),
    /// Switch between surfaces and volume.
    Mode(ModeCommand),
}

impl KeyCommand {
    /// Looks up the command bound to `key` in `variant`'s keymap.
    #[must_use]
    pub fn parse(variant: Variant, key: &str) -> Option<Self> {
        use Direction::{Decrease, Increase};

        let iso1 = OpacityAdjustment::Anchor(Anchor::Iso1);
        let iso2 = OpacityAdjustment::Anchor(Anchor::Iso2);

        let command = match (variant, key) {
            (Variant::SurfaceAndVolume, "Right") => KeyCommand::StepSize(Increase),
            (Variant::SurfaceAndVolume, "Left") => KeyCommand::StepSize(Decrease),
            (Variant::SurfaceAndVolume, "1") => KeyCommand::Opacity(iso1, Increase),
            (Variant::SurfaceAndVolume, "2") => KeyCommand::Opacity(iso1, Decrease),
            (Variant::SurfaceAndVolume, "3") => KeyCommand::Opacity(iso2, Increase),
            (Variant::SurfaceAndVolume, "4") => KeyCommand::Opacity(iso2, Decrease),
            (Variant::SurfaceAndVolume, "v") => KeyCommand::Mode(ModeCommand::SwitchToVolume),
            (Variant::SurfaceAndVolume, "i") => KeyCommand::Mode(ModeCommand::SwitchToSurface),
            (Variant::VolumeOnly, "Up") => KeyCommand::Opacity(OpacityAdjustment::All, Increase),
            (Variant::VolumeOnly, "Down") => {
                KeyCommand::Opacity(OpacityAdjustment::All, Decrease)
            }
            _ => return None,
        };
        Some(command)
    }
}

/// Key names bound in a variant, in help order.
#[must_use]
pub fn bound_keys(variant: Variant) -> &'static [&'static str] {
    match variant {
        Variant::SurfaceAndVolume => &["Right", "Left", "1", "2", "3", "4", "v", "i"],
        Variant::VolumeOnly => &["Up", "Down"],
    }
}
