use std::path::PathBuf;

use super::*;

fn fixture_library() -> FontLibrary {
    let mut lib = FontLibrary::empty();
    lib.load_dir(&PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts"));
    lib
}

#[test]
fn layout_plain_produces_a_nonempty_box() {
    let lib = fixture_library();
    let face = lib.query("DejaVu Sans", 400).unwrap();
    let mut engine = TextLayoutEngine::new();

    let shaped = engine
        .layout_plain("HELLO", &lib, &face, 48.0, TextBrushRgba8::default())
        .unwrap();
    assert!(shaped.width > 48.0);
    assert!(shaped.height > 0.0);
    assert_eq!(shaped.layout.lines().count(), 1);
}

#[test]
fn bigger_size_gives_wider_box() {
    let lib = fixture_library();
    let face = lib.query("DejaVu Sans", 700).unwrap();
    let mut engine = TextLayoutEngine::new();

    let small = engine
        .layout_plain("edit", &lib, &face, 20.0, TextBrushRgba8::default())
        .unwrap();
    let large = engine
        .layout_plain("edit", &lib, &face, 80.0, TextBrushRgba8::default())
        .unwrap();
    assert!(large.width > small.width);
    assert_eq!(engine.registered_faces(), 1);
}

#[test]
fn rejects_non_positive_size() {
    let lib = fixture_library();
    let face = lib.query("DejaVu Sans", 400).unwrap();
    let mut engine = TextLayoutEngine::new();

    let err = engine
        .layout_plain("x", &lib, &face, 0.0, TextBrushRgba8::default())
        .unwrap_err();
    assert!(matches!(err, TextBehindError::Validation(_)));
}

#[test]
fn brush_from_array_keeps_channel_order() {
    let brush = TextBrushRgba8::from_array([1, 2, 3, 4]);
    assert_eq!((brush.r, brush.g, brush.b, brush.a), (1, 2, 3, 4));
}
