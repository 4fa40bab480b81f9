use super::{
    ActiveEventLoop, App, ApplicationHandler, Arc, ElementState, InputEvent, IsoscopeError, Key,
    LogicalSize, MouseButton, NamedKey, PhysicalPosition, PhysicalSize, Vec2, Viewer, Window,
    WindowBackend, WindowEvent, WindowId,
};

/// Key-symbol name for a logical key: arrows become `Right`, `Left`, `Up`
/// and `Down`, characters are passed through.
pub(super) fn key_name(key: &Key) -> String {
    match key {
        Key::Named(NamedKey::ArrowRight) => "Right".to_string(),
        Key::Named(NamedKey::ArrowLeft) => "Left".to_string(),
        Key::Named(NamedKey::ArrowUp) => "Up".to_string(),
        Key::Named(NamedKey::ArrowDown) => "Down".to_string(),
        Key::Named(named) => format!("{named:?}"),
        Key::Character(text) => text.to_string(),
        Key::Unidentified(_) | Key::Dead(_) => "Unidentified".to_string(),
    }
}

/// Converts a cursor position in pixels (origin top-left) to normalized
/// display coordinates (origin bottom-left).
#[allow(clippy::cast_possible_truncation)]
pub(super) fn normalized_cursor(position: PhysicalPosition<f64>, size: PhysicalSize<u32>) -> Vec2 {
    let width = f64::from(size.width.max(1));
    let height = f64::from(size.height.max(1));
    Vec2::new(
        (position.x / width) as f32,
        (1.0 - position.y / height) as f32,
    )
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(session) = self.pending.take() else {
            return;
        };

        let options = session.options();
        let title = options.window_title.clone();
        let window_attributes = Window::default_attributes()
            .with_title(title.as_str())
            .with_inner_size(LogicalSize::new(
                options.window_size.x,
                options.window_size.y,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(
                    event_loop,
                    IsoscopeError::EventLoop(format!("failed to create window: {err}")),
                );
                return;
            }
        };

        let backend = match WindowBackend::new(window.clone(), title) {
            Ok(backend) => backend,
            Err(err) => {
                self.fail(event_loop, err);
                return;
            }
        };
        let mut viewer = Viewer::new(session, backend);
        let first = viewer.render();
        self.window = Some(window);
        self.viewer = Some(viewer);
        if let Err(err) = first {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                if event.logical_key == Key::Named(NamedKey::Escape) {
                    self.close_requested = true;
                } else {
                    let name = key_name(&event.logical_key);
                    self.dispatch(event_loop, InputEvent::Key(name));
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(window) = &self.window {
                    self.cursor = normalized_cursor(position, window.inner_size());
                }
                self.dispatch(event_loop, InputEvent::PointerMoved(self.cursor));
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let event = match state {
                    ElementState::Pressed => InputEvent::PointerPressed(self.cursor),
                    ElementState::Released => InputEvent::PointerReleased,
                };
                self.dispatch(event_loop, event);
            }
            WindowEvent::Resized(size) => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.backend_mut().resize(size);
                }
            }
            WindowEvent::RedrawRequested => {
                let result = self.viewer.as_mut().map(|v| v.backend_mut().redraw());
                if let Some(Err(err)) = result {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }

        if self.close_requested {
            event_loop.exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(&Key::Named(NamedKey::ArrowRight)), "Right");
        assert_eq!(key_name(&Key::Named(NamedKey::ArrowDown)), "Down");
        assert_eq!(key_name(&Key::Character("v".into())), "v");
        assert_eq!(key_name(&Key::Character("1".into())), "1");
        assert_eq!(key_name(&Key::Named(NamedKey::Tab)), "Tab");
    }

    #[test]
    fn test_normalized_cursor() {
        let size = PhysicalSize::new(800, 600);
        let p = normalized_cursor(PhysicalPosition::new(400.0, 600.0), size);
        assert!((p - Vec2::new(0.5, 0.0)).length() < 1e-6);
        let p = normalized_cursor(PhysicalPosition::new(80.0, 540.0), size);
        assert!((p - Vec2::new(0.1, 0.1)).length() < 1e-6);
    }
}
