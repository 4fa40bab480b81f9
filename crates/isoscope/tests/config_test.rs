//! Loading options and volumes from files, as the `isoscope` binary does.

use std::sync::Arc;

use isoscope::*;
use isoscope_core::UVec2;

fn write(dir: &tempfile::TempDir, name: &str, contents: impl AsRef<[u8]>) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_config_file_with_variant_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "head.json",
        r#"{ "variant": "surface_and_volume", "window_title": "head", "volume": { "sample_step_size": 0.25 } }"#,
    );

    let options = Options::from_json_file(&path).unwrap();
    assert_eq!(options.variant, Variant::SurfaceAndVolume);
    assert_eq!(options.window_title, "head");
    assert_eq!(options.volume.sample_step_size, 0.25);

    // `--variant volume --config head.json`
    let options = Options::from_json_file_as(&path, Some(Variant::VolumeOnly)).unwrap();
    assert_eq!(options.variant, Variant::VolumeOnly);
    assert_eq!(options.window_title, "head");
    assert_eq!(options.window_size, UVec2::new(640, 480));
    assert_eq!(options.volume.blend_mode, BlendMode::Composite);
    assert_eq!(options.volume.sample_step_size, 0.25);
}

#[test]
fn test_printed_options_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let options = Options::volume_only().with_min_sample_step_size(Some(0.1));
    let path = write(&dir, "printed.json", options.to_json().unwrap());
    assert_eq!(Options::from_json_file(&path).unwrap(), options);
}

#[test]
fn test_bad_config_files() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        Options::from_json_file(&missing),
        Err(IsoscopeError::Io(_))
    ));

    let garbage = write(&dir, "garbage.json", "{ volume: ");
    assert!(matches!(
        Options::from_json_file(&garbage),
        Err(IsoscopeError::Json(_))
    ));

    // Opacity points that leave out the anchors would let the per-anchor
    // keys insert points.
    let no_anchors = write(
        &dir,
        "no_anchors.json",
        r#"{ "volume": { "opacity_points": [
            { "x": 0.0, "opacity": 0.1 },
            { "x": 2000.0, "opacity": 0.9 }
        ] } }"#,
    );
    assert!(matches!(
        Options::from_json_file_as(&no_anchors, None),
        Err(IsoscopeError::InvalidConfig(_))
    ));
}

#[test]
fn test_session_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(
        &dir,
        "head.json",
        r#"{ "volume": { "sample_step_size": 0.3, "min_sample_step_size": 0.2 } }"#,
    );
    let mut volume = b"NDims = 3\nDimSize = 2 2 2\nElementType = MET_USHORT\nElementDataFile = LOCAL\n".to_vec();
    volume.extend([0u16, 100, 200, 300, 400, 500, 600, 1150].iter().flat_map(|v| v.to_le_bytes()));
    let volume = write(&dir, "head.mha", volume);

    let options = Options::from_json_file(&config).unwrap();
    let field = isoscope_io::read_scalar_field(&volume, &options).unwrap();
    assert_eq!(field.scalar_range(), (0.0, 1150.0));

    let mut session = Session::new(Arc::new(field), options);
    session.handle_key("Left");
    assert!((session.sample_step_size() - 0.2).abs() < 1e-6);
    session.handle_key("1");
    assert_eq!(session.transfer_function().opacity().len(), 2);
}
