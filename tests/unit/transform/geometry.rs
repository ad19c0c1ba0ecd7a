use super::*;
use crate::layers::model::LayerId;

fn layer() -> TextLayer {
    TextLayer::with_defaults(LayerId(1))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn centered_layer_anchors_at_half_extent() {
    let canvas = Canvas::new(1200, 800).unwrap();
    let g = ExportGeometry::for_layer(&layer(), canvas);
    assert_eq!(g.anchor, Point::new(600.0, 400.0));
    assert_eq!(g.rotation_rad, 0.0);
}

#[test]
fn top_moves_up_and_left_moves_right() {
    let canvas = Canvas::new(1000, 500).unwrap();
    let p = anchor_px(canvas, 25.0, 10.0);
    assert!(close(p.x, 600.0));
    assert!(close(p.y, 125.0));

    let corner = anchor_px(canvas, 50.0, -50.0);
    assert!(close(corner.x, 0.0));
    assert!(close(corner.y, 0.0));
}

#[test]
fn font_sizes_follow_the_fixed_formulas() {
    assert!(close(preview_font_size_percent(200.0), 800.0));
    assert!(close(export_font_size_px(200.0), 1940.0));
    assert!(close(export_font_size_px(100.0), 800.0 + 85.0));
    assert!(close(export_font_size_px(0.0), 0.0));
}

#[test]
fn export_font_size_is_monotonic_for_non_negative_units() {
    let mut prev = export_font_size_px(0.0);
    for i in 1..=400 {
        let next = export_font_size_px(f64::from(i) * 2.5);
        assert!(next > prev);
        prev = next;
    }
}

#[test]
fn rotation_is_clockwise_in_raster_space() {
    let mut l = layer();
    l.rotation = 90.0;
    let g = ExportGeometry::for_layer(&l, Canvas::new(200, 200).unwrap());
    // A point to the right of the anchor ends up below it.
    let p = g.to_affine() * Point::new(10.0, 0.0);
    assert!(close(p.x, 100.0));
    assert!(close(p.y, 110.0));
}

#[test]
fn text_box_is_centered_on_the_anchor() {
    let g = ExportGeometry::for_layer(&layer(), Canvas::new(300, 100).unwrap());
    let center = g.text_box_affine(80.0, 20.0) * Point::new(40.0, 10.0);
    assert!(close(center.x, 150.0));
    assert!(close(center.y, 50.0));
}

#[test]
fn preview_and_export_agree_on_relative_center() {
    let mut l = layer();
    l.top = -17.5;
    l.left = 31.0;
    l.rotation = -12.0;

    let canvas = Canvas::new(1200, 800).unwrap();
    let export = ExportGeometry::for_layer(&l, canvas);
    let preview = PreviewGeometry::for_layer(&l);
    for (w, h) in [(600.0, 400.0), (333.0, 222.0), (1200.0, 800.0)] {
        let a = preview.anchor_in(w, h);
        assert!(close(a.x / w, export.anchor.x / 1200.0));
        assert!(close(a.y / h, export.anchor.y / 800.0));
    }
}

#[test]
fn preview_css_values() {
    let mut l = layer();
    l.top = 10.0;
    l.left = -20.0;
    l.rotation = 45.0;
    l.font_size_units = 100.0;
    let g = PreviewGeometry::for_layer(&l);
    assert_eq!(g.top_percent, 40.0);
    assert_eq!(g.left_percent, 30.0);
    assert_eq!(g.font_size_percent, 400.0);
    assert_eq!(g.css_transform(), "translate(-50%, -50%) rotate(45deg)");
}
