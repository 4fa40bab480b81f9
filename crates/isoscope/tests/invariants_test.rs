//! Property tests: arbitrary key and slider sequences keep the session
//! consistent.

use std::sync::Arc;

use isoscope::*;
use isoscope_core::UVec3;
use proptest::prelude::*;

struct CountingBackend(u64);

impl RenderBackend for CountingBackend {
    fn render(&mut self, _frame: &Frame<'_>) -> Result<()> {
        self.0 += 1;
        Ok(())
    }
}

fn field() -> Arc<ScalarField> {
    let samples = (0..8u8).map(|v| f32::from(v) * 200.0).collect();
    Arc::new(ScalarField::new(UVec3::splat(2), Vec3::ONE, Vec3::ZERO, samples).unwrap())
}

fn event_strategy() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        6 => prop::sample::select(vec![
            "Right", "Left", "1", "2", "3", "4", "v", "i", "Up", "Down", "x", "Escape",
        ])
        .prop_map(|k| InputEvent::Key(k.to_string())),
        1 => (0.0f32..1.0).prop_map(InputEvent::SliderChanged),
        1 => (0.0f32..1.0, 0.0f32..0.2)
            .prop_map(|(x, y)| InputEvent::PointerPressed(Vec2::new(x, y))),
        1 => (0.0f32..1.0, 0.0f32..0.2)
            .prop_map(|(x, y)| InputEvent::PointerMoved(Vec2::new(x, y))),
        1 => Just(InputEvent::PointerReleased),
    ]
}

fn check_invariants(session: &Session) {
    let scene = session.scene();
    let surfaces = scene.is_attached(PropId::Skin) && scene.is_attached(PropId::Bone);
    let volume = scene.is_attached(PropId::Volume);
    assert!(scene.is_attached(PropId::Outline));
    assert!(surfaces != volume);
    assert_eq!(scene.len(), if volume { 2 } else { 3 });
    assert_eq!(volume, session.mode() == RenderMode::Volume);
    assert_eq!(session.slider().is_enabled(), session.mode() == RenderMode::Surface);

    let tf = session.transfer_function();
    for point in tf.opacity().points() {
        assert!((0.0..=1.0).contains(&point.opacity));
    }
    let skin = session.skin_opacity();
    assert!((0.0..=1.0).contains(&skin));
}

proptest! {
    #[test]
    fn surface_variant_stays_consistent(events in prop::collection::vec(event_strategy(), 0..60)) {
        let session = Session::new(field(), Options::surface_and_volume());
        let mut viewer = Viewer::new(session, CountingBackend(0));
        let mut keys = 0;
        for event in events {
            let is_key = matches!(event, InputEvent::Key(_));
            let before = viewer.backend().0;
            let rendered = viewer.dispatch(event).unwrap();
            let after = viewer.backend().0;
            prop_assert!(after - before <= 1);
            prop_assert_eq!(rendered, after == before + 1);
            if is_key {
                keys += 1;
                prop_assert!(rendered);
                let tf = viewer.session().transfer_function();
                let xs: Vec<f32> = tf.color().points().iter().map(|p| p.x).collect();
                prop_assert_eq!(xs, vec![500.0, 1150.0]);
            }
            check_invariants(viewer.session());
        }
        prop_assert!(viewer.frames_rendered() >= keys);
    }

    #[test]
    fn volume_only_variant_stays_consistent(events in prop::collection::vec(event_strategy(), 0..60)) {
        let session = Session::new(field(), Options::volume_only());
        let mut viewer = Viewer::new(session, CountingBackend(0));
        for event in events {
            viewer.dispatch(event).unwrap();
            check_invariants(viewer.session());
            prop_assert_eq!(viewer.session().mode(), RenderMode::Volume);
            prop_assert_eq!(viewer.session().transfer_function().opacity().len(), 4);
        }
    }
}
