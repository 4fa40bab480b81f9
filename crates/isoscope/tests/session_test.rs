//! Integration tests for key and slider dispatch.
//!
//! Rendering goes through a recording backend, so no window is needed.

use std::sync::Arc;

use isoscope::*;
use isoscope_core::{OpacityPoint, UVec3};

/// Backend that keeps a summary of every frame it is asked to draw.
#[derive(Default)]
struct RecordingBackend {
    frames: Vec<String>,
    fail_after: Option<usize>,
}

impl RenderBackend for RecordingBackend {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        if self.fail_after.is_some_and(|n| self.frames.len() >= n) {
            return Err(IsoscopeError::Render("device lost".to_string()));
        }
        self.frames.push(frame.summary());
        Ok(())
    }
}

fn head() -> Arc<ScalarField> {
    let samples = (0..27u16).map(|v| f32::from(v) * 50.0).collect();
    Arc::new(
        ScalarField::new(UVec3::splat(3), Vec3::new(3.2, 3.2, 1.5), Vec3::ZERO, samples)
            .expect("valid field"),
    )
}

fn viewer(options: Options) -> Viewer<RecordingBackend> {
    Viewer::new(Session::new(head(), options), RecordingBackend::default())
}

fn key(name: &str) -> InputEvent {
    InputEvent::Key(name.to_string())
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn surfaces_shown(session: &Session) -> bool {
    session.scene().is_attached(PropId::Skin) && session.scene().is_attached(PropId::Bone)
}

#[test]
fn test_opacity_and_mode_scenario() {
    let mut viewer = viewer(Options::surface_and_volume());
    {
        let s = viewer.session();
        assert_eq!(s.mode(), RenderMode::Surface);
        assert!(approx(s.opacity_at(Anchor::Iso1), 0.3));
        assert!(approx(s.opacity_at(Anchor::Iso2), 0.6));
        assert!(approx(s.sample_step_size(), 0.5));
    }

    viewer.dispatch(key("1")).unwrap();
    assert!(approx(viewer.session().opacity_at(Anchor::Iso1), 0.4));

    for _ in 0..10 {
        viewer.dispatch(key("2")).unwrap();
    }
    assert_eq!(viewer.session().opacity_at(Anchor::Iso1), 0.0);
    assert!(approx(viewer.session().opacity_at(Anchor::Iso2), 0.6));

    viewer.dispatch(key("v")).unwrap();
    assert_eq!(viewer.session().mode(), RenderMode::Volume);
    assert!(!viewer.session().slider().is_enabled());
    assert!(!surfaces_shown(viewer.session()));

    viewer.dispatch(key("v")).unwrap();
    assert_eq!(viewer.session().mode(), RenderMode::Volume);
    assert_eq!(
        viewer.session().scene().props(),
        &[PropId::Outline, PropId::Volume]
    );

    viewer.dispatch(key("i")).unwrap();
    let s = viewer.session();
    assert_eq!(s.mode(), RenderMode::Surface);
    assert!(s.slider().is_enabled());
    assert!(surfaces_shown(s));
    assert!(!s.scene().is_attached(PropId::Volume));
    assert!(s.scene().is_attached(PropId::Outline));

    // 1 + 10 + 3 keys, one frame each.
    assert_eq!(viewer.frames_rendered(), 14);
    assert_eq!(viewer.backend().frames.len(), 14);
}

#[test]
fn test_one_render_per_event() {
    let mut viewer = viewer(Options::surface_and_volume());

    // Unbound keys still render once.
    assert!(viewer.dispatch(key("x")).unwrap());
    assert!(viewer.dispatch(key("Up")).unwrap());
    assert_eq!(viewer.frames_rendered(), 2);

    // Pointer motion away from the slider does not render.
    assert!(!viewer
        .dispatch(InputEvent::PointerMoved(Vec2::new(0.5, 0.5)))
        .unwrap());
    assert!(!viewer
        .dispatch(InputEvent::PointerPressed(Vec2::new(0.5, 0.9)))
        .unwrap());
    assert_eq!(viewer.frames_rendered(), 2);

    // A drag renders once per value change.
    assert!(viewer
        .dispatch(InputEvent::PointerPressed(Vec2::new(0.24, 0.1)))
        .unwrap());
    assert!(viewer
        .dispatch(InputEvent::PointerMoved(Vec2::new(0.66, 0.1)))
        .unwrap());
    assert!(!viewer.dispatch(InputEvent::PointerReleased).unwrap());
    assert_eq!(viewer.frames_rendered(), 4);
    assert!(approx(viewer.session().skin_opacity(), 0.8));
}

#[test]
fn test_slider_gated_by_mode() {
    let mut viewer = viewer(Options::surface_and_volume());

    assert!(viewer.dispatch(InputEvent::SliderChanged(0.25)).unwrap());
    assert!(approx(viewer.session().skin_opacity(), 0.25));
    assert!(viewer.backend().frames[0].contains("skin opacity 0.25"));

    viewer.dispatch(key("v")).unwrap();
    assert!(!viewer.dispatch(InputEvent::SliderChanged(0.9)).unwrap());
    assert!(!viewer
        .dispatch(InputEvent::PointerPressed(Vec2::new(0.3, 0.1)))
        .unwrap());
    assert!(approx(viewer.session().skin_opacity(), 0.25));

    viewer.dispatch(key("i")).unwrap();
    assert!(viewer.dispatch(InputEvent::SliderChanged(0.9)).unwrap());
    assert!(approx(viewer.session().skin_opacity(), 0.9));
}

#[test]
fn test_color_points_rebuilt_after_every_key() {
    let mut viewer = viewer(Options::surface_and_volume());
    for name in ["3", "3", "3", "3", "4", "Right", "q", "v", "i"] {
        viewer.dispatch(key(name)).unwrap();
        let tf = viewer.session().transfer_function();
        let xs: Vec<f32> = tf.color().points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![500.0, 1150.0]);
    }
    assert!(approx(viewer.session().opacity_at(Anchor::Iso2), 0.9));
}

#[test]
fn test_volume_only_keys() {
    let mut viewer = viewer(Options::volume_only());
    assert_eq!(viewer.session().mode(), RenderMode::Volume);

    for _ in 0..20 {
        viewer.dispatch(key("Down")).unwrap();
    }
    let tf = viewer.session().transfer_function();
    assert!(tf.opacity().points().iter().all(|p| p.opacity == 0.0));
    assert_eq!(tf.opacity().len(), 4);
    drop(tf);

    viewer.dispatch(key("Up")).unwrap();
    let tf = viewer.session().transfer_function();
    assert!(tf.opacity().points().iter().all(|p| approx(p.opacity, 0.1)));
    drop(tf);

    // Step size keys are not bound in this variant.
    viewer.dispatch(key("Right")).unwrap();
    assert!(approx(viewer.session().volume().sample_step_size(), 1.0));
    assert_eq!(viewer.frames_rendered(), 22);
}

#[test]
fn test_render_failure_is_reported() {
    let backend = RecordingBackend {
        frames: Vec::new(),
        fail_after: Some(1),
    };
    let mut viewer = Viewer::new(Session::new(head(), Options::default()), backend);
    viewer.dispatch(key("1")).unwrap();
    let err = viewer.dispatch(key("1")).unwrap_err();
    assert!(matches!(err, IsoscopeError::Render(_)));
    assert_eq!(viewer.frames_rendered(), 1);
}

#[test]
fn test_frame_contents() {
    let mut viewer = viewer(Options::surface_and_volume());
    viewer.render().unwrap();
    {
        let frame = viewer.session().frame(0);
        assert!(frame.shows(PropId::Outline));
        assert_eq!(frame.visible_surfaces().count(), 2);
        assert!(frame.slider.is_some());
    }

    viewer.dispatch(key("v")).unwrap();
    let frame = viewer.session().frame(1);
    assert_eq!(frame.visible_surfaces().count(), 0);
    assert!(frame.shows(PropId::Volume));
    assert!(frame.slider.is_none());
    assert_eq!(
        viewer.backend().frames.last().map(String::as_str),
        Some("volume | step 0.50 | opacity 0.30 0.60")
    );
}

#[test]
fn test_anchor_keys_never_add_points() {
    // Opacity points that skip both anchors, built directly so option
    // validation does not reject them.
    let mut options = Options::surface_and_volume();
    options.volume.opacity_points = vec![OpacityPoint::new(0.0, 0.1), OpacityPoint::new(2000.0, 0.9)];
    let mut viewer = viewer(options);
    let before = viewer.session().transfer_function().opacity().clone();

    for name in ["x", "1", "1", "3", "4", "Right"] {
        viewer.dispatch(key(name)).unwrap();
        assert_eq!(viewer.session().transfer_function().opacity(), &before);
    }
    assert_eq!(viewer.frames_rendered(), 6);
}
