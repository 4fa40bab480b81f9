//! The scene graph: which props are currently attached to the renderer.

use std::fmt;

/// A visual prop that can be attached to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropId {
    /// Bounding-box outline of the field.
    Outline,
    /// Skin iso-surface.
    Skin,
    /// Bone iso-surface.
    Bone,
    /// Direct-rendered volume.
    Volume,
}

impl fmt::Display for PropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropId::Outline => "outline",
            PropId::Skin => "skin",
            PropId::Bone => "bone",
            PropId::Volume => "volume",
        };
        f.write_str(name)
    }
}

/// A single edit to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEdit {
    Attach(PropId),
    Detach(PropId),
}

/// Ordered set of attached props.
///
/// Attaching a prop twice or detaching a prop that is not attached leaves
/// the scene unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneGraph {
    props: Vec<PropId>,
}

impl SceneGraph {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a prop. Returns `false` if it was already attached.
    pub fn attach(&mut self, prop: PropId) -> bool {
        if self.props.contains(&prop) {
            return false;
        }
        self.props.push(prop);
        true
    }

    /// Detaches a prop. Returns `false` if it was not attached.
    pub fn detach(&mut self, prop: PropId) -> bool {
        let Some(idx) = self.props.iter().position(|p| *p == prop) else {
            return false;
        };
        self.props.remove(idx);
        true
    }

    /// Applies one edit.
    pub fn apply(&mut self, edit: SceneEdit) -> bool {
        match edit {
            SceneEdit::Attach(prop) => self.attach(prop),
            SceneEdit::Detach(prop) => self.detach(prop),
        }
    }

    #[must_use]
    pub fn is_attached(&self, prop: PropId) -> bool {
        self.props.contains(&prop)
    }

    /// Returns attached props in attachment order.
    #[must_use]
    pub fn props(&self) -> &[PropId] {
        &self.props
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}
