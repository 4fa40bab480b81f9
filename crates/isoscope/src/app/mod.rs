//! Application window and event loop management.

mod gpu;
mod input;

pub(super) use std::sync::Arc;

pub(super) use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use glam::Vec3;
use isoscope_core::{IsoscopeError, Result};
use pollster::FutureExt;

use self::gpu::GpuRenderer;
use crate::geometry::{frame_lines, LineBatch};

pub(super) use crate::render::{Frame, RenderBackend};
pub(super) use crate::session::Session;
pub(super) use crate::viewer::{InputEvent, Viewer};
pub(super) use glam::Vec2;

/// Backend bound to the application window.
///
/// Each render pass clears the window to the background color and draws the
/// outline, the opacity slider and, in volume mode, the opacity curve as
/// lines. The frame summary goes to the title bar. Surfaces and the volume
/// itself are not rasterized.
pub struct WindowBackend {
    window: Arc<Window>,
    title: String,
    gpu: GpuRenderer,
    background: Vec3,
    lines: LineBatch,
}

impl WindowBackend {
    /// Sets up the GPU surface for `window`, blocking until it is ready.
    pub fn new(window: Arc<Window>, title: impl Into<String>) -> Result<Self> {
        let gpu = GpuRenderer::new(window.clone()).block_on()?;
        Ok(Self {
            window,
            title: title.into(),
            gpu,
            background: Vec3::ZERO,
            lines: LineBatch::new(),
        })
    }

    /// Draws the last rendered frame again.
    pub fn redraw(&mut self) -> Result<()> {
        if !self.gpu.draw(self.background, self.lines.vertices())? {
            self.window.request_redraw();
        }
        Ok(())
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size.width, size.height);
        self.window.request_redraw();
    }
}

impl RenderBackend for WindowBackend {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        let summary = frame.summary();
        log::debug!("frame {}: {summary}", frame.index);
        self.window.set_title(&format!("{} - {summary}", self.title));
        self.background = frame.background;
        self.lines = frame_lines(frame, self.gpu.aspect());
        self.redraw()
    }
}

/// The isoscope application state.
pub struct App {
    pub(super) pending: Option<Session>,
    pub(super) viewer: Option<Viewer<WindowBackend>>,
    pub(super) window: Option<Arc<Window>>,
    pub(super) close_requested: bool,
    // Cursor in normalized display coordinates, origin bottom-left
    pub(super) cursor: Vec2,
    pub(super) error: Option<IsoscopeError>,
}

impl App {
    /// Creates an application that will show `session` once the window
    /// exists.
    pub fn new(session: Session) -> Self {
        Self {
            pending: Some(session),
            viewer: None,
            window: None,
            close_requested: false,
            cursor: Vec2::ZERO,
            error: None,
        }
    }

    /// Forwards an event to the viewer. A failed render ends the loop.
    pub(super) fn dispatch(&mut self, event_loop: &ActiveEventLoop, event: InputEvent) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        if let Err(err) = viewer.dispatch(event) {
            self.fail(event_loop, err);
        }
    }

    pub(super) fn fail(&mut self, event_loop: &ActiveEventLoop, err: IsoscopeError) {
        log::error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }
}

/// Runs the event loop until the window is closed or a render fails.
pub fn run_app(session: Session) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| IsoscopeError::EventLoop(e.to_string()))?;
    let mut app = App::new(session);

    event_loop
        .run_app(&mut app)
        .map_err(|e| IsoscopeError::EventLoop(e.to_string()))?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
