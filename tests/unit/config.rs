use super::*;

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "text-behind-config-{}-{name}.json",
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn missing_fields_take_defaults() {
    let path = write_temp("partial", r#"{ "system_fonts": false }"#);
    let cfg = EditorConfig::from_path(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert!(!cfg.system_fonts);
    assert_eq!(cfg.log_filter, "info");
    assert_eq!(cfg.output_dir, PathBuf::from("."));
    assert!(cfg.segmentation_command.is_none());
}

#[test]
fn unknown_fields_are_a_serde_error() {
    let path = write_temp("unknown", r#"{ "gpu": true }"#);
    let err = EditorConfig::from_path(&path).unwrap_err();
    let _ = std::fs::remove_file(&path);
    assert!(matches!(err, TextBehindError::Serde(_)));
}

#[test]
fn validate_rejects_bad_command_and_empty_filter() {
    let cfg = EditorConfig {
        segmentation_command: Some("rembg i {in}".to_string()),
        ..EditorConfig::default()
    };
    assert!(matches!(
        cfg.validate().unwrap_err(),
        TextBehindError::Validation(_)
    ));

    let cfg = EditorConfig {
        log_filter: " ".to_string(),
        ..EditorConfig::default()
    };
    assert!(cfg.validate().is_err());
    assert!(EditorConfig::default().validate().is_ok());
}

#[test]
fn font_library_loads_configured_dirs_only() {
    let cfg = EditorConfig {
        system_fonts: false,
        font_dirs: vec![PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts")],
        ..EditorConfig::default()
    };
    assert_eq!(cfg.font_library().face_count(), 2);
}

#[test]
fn remover_is_built_from_the_command() {
    assert!(EditorConfig::default().remover().unwrap().is_none());
    let cfg = EditorConfig {
        segmentation_command: Some("rembg i {in} {out}".to_string()),
        ..EditorConfig::default()
    };
    let remover = cfg.remover().unwrap().unwrap();
    assert_eq!(remover.name(), "rembg");
}
