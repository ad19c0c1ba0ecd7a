use std::path::PathBuf;

use super::*;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts")
}

fn fixture_library() -> FontLibrary {
    let mut lib = FontLibrary::empty();
    let added = lib.load_dir(&fixture_dir());
    assert_eq!(added, 2);
    lib
}

#[test]
fn empty_library_resolves_nothing() {
    let lib = FontLibrary::empty();
    assert_eq!(lib.face_count(), 0);
    assert!(lib.query("DejaVu Sans", 400).is_none());
}

#[test]
fn load_dir_skips_non_font_files_and_missing_dirs() {
    let mut lib = FontLibrary::empty();
    assert_eq!(lib.load_dir(&fixture_dir().join("missing")), 0);
    lib.load_dir(&fixture_dir());
    assert_eq!(lib.families(), vec!["DejaVu Sans".to_string()]);
}

#[test]
fn weight_selects_the_matching_face() {
    let lib = fixture_library();
    let regular = lib.query("DejaVu Sans", 400).unwrap();
    let bold = lib.query("DejaVu Sans", 800).unwrap();
    assert!(regular.exact_family);
    assert_eq!(regular.weight, 400);
    assert_eq!(bold.weight, 700);
    assert_ne!(regular.id, bold.id);
}

#[test]
fn unknown_family_falls_back_to_closest_face() {
    let lib = fixture_library();
    let m = lib.query("Inter", 800).unwrap();
    assert!(!m.exact_family);
    assert_eq!(m.family, "DejaVu Sans");
    assert_eq!(m.weight, 700);
}

#[test]
fn face_bytes_are_available_for_matches() {
    let lib = fixture_library();
    let m = lib.query("DejaVu Sans", 400).unwrap();
    let (bytes, index) = lib.face_bytes(m.id).unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(index, 0);
}

#[test]
fn load_font_data_rejects_garbage() {
    let mut lib = FontLibrary::empty();
    let err = lib.load_font_data(b"not a font".to_vec()).unwrap_err();
    assert!(matches!(err, TextBehindError::Render(_)));
}
