//! Render-mode state machine.
//!
//! The scene shows either the extracted surfaces (skin and bone) or the
//! direct-rendered volume, never both. The outline is attached in both modes
//! and is never touched by a transition.
//!
//! [`transition`] is a pure function from the current mode and a command to
//! the next mode plus the scene edits that get there.
//! [`RenderModeController`] owns the current mode and applies those edits.

use serde::{Deserialize, Serialize};

use crate::scene::{PropId, SceneEdit, SceneGraph};

/// Which representation of the field is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RenderMode {
    /// Skin and bone iso-surfaces.
    #[default]
    Surface,
    /// Direct volume rendering.
    Volume,
}

impl RenderMode {
    /// Returns whether the skin opacity slider accepts input in this mode.
    #[must_use]
    pub fn slider_interactive(self) -> bool {
        self == RenderMode::Surface
    }

    /// Props attached in this mode, besides the outline.
    #[must_use]
    pub fn props(self) -> &'static [PropId] {
        match self {
            RenderMode::Surface => &[PropId::Skin, PropId::Bone],
            RenderMode::Volume => &[PropId::Volume],
        }
    }
}

/// A request to change the render mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCommand {
    SwitchToVolume,
    SwitchToSurface,
}

impl ModeCommand {
    /// The mode this command leads to.
    #[must_use]
    pub fn target(self) -> RenderMode {
        match self {
            ModeCommand::SwitchToVolume => RenderMode::Volume,
            ModeCommand::SwitchToSurface => RenderMode::Surface,
        }
    }
}

/// Result of evaluating a command against the current mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTransition {
    /// Mode after the transition.
    pub next: RenderMode,
    /// Scene edits to perform, in order.
    pub edits: Vec<SceneEdit>,
    /// New slider state, if it changes.
    pub slider_enabled: Option<bool>,
}

impl ModeTransition {
    /// Returns true if the command changes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.edits.is_empty() && self.slider_enabled.is_none()
    }
}

/// Computes the transition for `command` issued in `current`.
///
/// Re-issuing the command for the mode already active is a no-op.
#[must_use]
pub fn transition(current: RenderMode, command: ModeCommand) -> ModeTransition {
    let next = command.target();
    if next == current {
        return ModeTransition {
            next,
            edits: Vec::new(),
            slider_enabled: None,
        };
    }

    let edits = current
        .props()
        .iter()
        .map(|&p| SceneEdit::Detach(p))
        .chain(next.props().iter().map(|&p| SceneEdit::Attach(p)))
        .collect();

    ModeTransition {
        next,
        edits,
        slider_enabled: Some(next.slider_interactive()),
    }
}

/// Builds the scene for a mode: the outline followed by the mode's props.
#[must_use]
pub fn initial_scene(mode: RenderMode) -> SceneGraph {
    let mut scene = SceneGraph::new();
    scene.attach(PropId::Outline);
    for &prop in mode.props() {
        scene.attach(prop);
    }
    scene
}

/// Owns the current render mode and applies transitions to a scene.
#[derive(Debug, Clone, Default)]
pub struct RenderModeController {
    mode: RenderMode,
}

impl RenderModeController {
    /// Creates a controller in the given mode.
    pub fn new(mode: RenderMode) -> Self {
        Self { mode }
    }

    /// Returns the current mode.
    #[must_use]
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Executes `command`, editing `scene` in place.
    ///
    /// Returns the transition that was applied so the caller can update the
    /// slider route.
    pub fn apply(&mut self, command: ModeCommand, scene: &mut SceneGraph) -> ModeTransition {
        let step = transition(self.mode, command);
        if step.is_noop() {
            log::debug!("already in {:?} mode, ignoring {:?}", self.mode, command);
            return step;
        }
        for &edit in &step.edits {
            scene.apply(edit);
        }
        log::info!("render mode {:?} -> {:?}", self.mode, step.next);
        self.mode = step.next;
        step
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn surfaces_and_volume_are_exclusive(
            commands in prop::collection::vec(any::<bool>(), 0..32)
        ) {
            let mut scene = initial_scene(RenderMode::Surface);
            let mut controller = RenderModeController::default();
            for to_volume in commands {
                let command = if to_volume {
                    ModeCommand::SwitchToVolume
                } else {
                    ModeCommand::SwitchToSurface
                };
                controller.apply(command, &mut scene);

                let surfaces = scene.is_attached(PropId::Skin) && scene.is_attached(PropId::Bone);
                let volume = scene.is_attached(PropId::Volume);
                prop_assert!(scene.is_attached(PropId::Outline));
                prop_assert!(surfaces != volume);
                prop_assert_eq!(volume, controller.mode() == RenderMode::Volume);
                prop_assert_eq!(scene.len(), if volume { 2 } else { 3 });
            }
        }
    }
}
