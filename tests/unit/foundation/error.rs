use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TextBehindError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        TextBehindError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        TextBehindError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        TextBehindError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        TextBehindError::segmentation("x")
            .to_string()
            .contains("segmentation error:")
    );
    assert!(
        TextBehindError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TextBehindError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
