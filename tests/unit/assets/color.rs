use super::*;
use serde_json::json;

#[test]
fn parses_named_and_hex() {
    assert_eq!(CssColor::new("white").to_rgba8().unwrap(), [255, 255, 255, 255]);
    assert_eq!(CssColor::new("#ff0000").to_rgba8().unwrap(), [255, 0, 0, 255]);
    assert_eq!(CssColor::new("#0f0").to_rgba8().unwrap(), [0, 255, 0, 255]);
    assert_eq!(CssColor::new("  blue ").to_rgba8().unwrap(), [0, 0, 255, 255]);
}

#[test]
fn parses_functional_rgba_with_alpha() {
    let [r, g, b, a] = CssColor::new("rgba(0, 0, 0, 0.8)").to_rgba8().unwrap();
    assert_eq!([r, g, b], [0, 0, 0]);
    assert!((i32::from(a) - 204).abs() <= 1);

    let [r, g, _, a] = CssColor::new("rgba(255, 0, 0, 0.5)").to_rgba8().unwrap();
    assert_eq!((r, g), (255, 0));
    assert!((i32::from(a) - 128).abs() <= 1);
}

#[test]
fn rejects_garbage_but_keeps_the_string() {
    let c = CssColor::new("not-a-color");
    assert!(c.to_rgba8().is_err());
    assert_eq!(c.as_str(), "not-a-color");
}

#[test]
fn serializes_as_plain_string() {
    let c: CssColor = serde_json::from_value(json!("#123456")).unwrap();
    assert_eq!(c, CssColor::from("#123456"));
    assert_eq!(serde_json::to_value(&c).unwrap(), json!("#123456"));
}
