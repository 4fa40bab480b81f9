//! Event dispatch: one input event in, at most one render pass out.

use glam::Vec2;
use isoscope_core::Result;

use crate::render::RenderBackend;
use crate::session::Session;

/// An input event, already translated from the windowing system.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key press, named by its key symbol (`"Right"`, `"1"`, `"v"`).
    Key(String),
    /// Primary button press, in normalized display coordinates.
    PointerPressed(Vec2),
    PointerMoved(Vec2),
    PointerReleased,
    /// A slider value set directly rather than by dragging.
    SliderChanged(f32),
}

/// Drives a [`Session`] and renders it through a backend.
pub struct Viewer<B> {
    session: Session,
    backend: B,
    frames: u64,
}

impl<B: RenderBackend> Viewer<B> {
    pub fn new(session: Session, backend: B) -> Self {
        Self {
            session,
            backend,
            frames: 0,
        }
    }

    /// Renders the current state once.
    pub fn render(&mut self) -> Result<()> {
        let frame = self.session.frame(self.frames);
        self.backend.render(&frame)?;
        self.frames += 1;
        Ok(())
    }

    /// Applies `event` to the session, then renders exactly once if the
    /// event changed what is shown.
    ///
    /// Every key press renders, bound or not. Pointer events render only
    /// when they move the slider. Returns whether a render happened.
    pub fn dispatch(&mut self, event: InputEvent) -> Result<bool> {
        let render = match event {
            InputEvent::Key(key) => {
                self.session.handle_key(&key);
                true
            }
            InputEvent::PointerPressed(position) => self.session.pointer_pressed(position),
            InputEvent::PointerMoved(position) => self.session.pointer_moved(position),
            InputEvent::PointerReleased => {
                self.session.pointer_released();
                false
            }
            InputEvent::SliderChanged(value) => self.session.on_slider_changed(value),
        };
        if render {
            self.render()?;
        }
        Ok(render)
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Number of completed render passes.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}
