use std::path::PathBuf;

use super::*;
use crate::assets::decode::PreparedImage;
use crate::layers::model::LayerId;
use crate::transform::geometry::export_font_size_px;

fn solid(width: u32, height: u32, rgba_premul: [u8; 4]) -> ImageLayer {
    let data: Vec<u8> = std::iter::repeat_n(rgba_premul, (width * height) as usize)
        .flatten()
        .collect();
    ImageLayer::new(
        "solid",
        PreparedImage {
            width,
            height,
            rgba8_premul: Arc::new(data),
        },
    )
}

fn fixture_fonts() -> FontLibrary {
    let mut lib = FontLibrary::empty();
    lib.load_dir(&PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts"));
    lib
}

fn assert_px_close(actual: Option<[u8; 4]>, expected: [u8; 4]) {
    let actual = actual.unwrap();
    for (a, e) in actual.iter().zip(expected) {
        assert!(i16::from(*a).abs_diff(i16::from(e)) <= 1, "{actual:?} vs {expected:?}");
    }
}

fn block_layer() -> TextLayer {
    let mut layer = TextLayer::with_defaults(LayerId(1));
    layer.text = "\u{2588}".to_string();
    layer.font_family = "DejaVu Sans".to_string();
    layer.font_weight = 400;
    layer.font_size_units = 20.0;
    layer.color = "#ff0000".into();
    layer
}

#[test]
fn clamp_opacity_handles_out_of_range_and_nan() {
    assert_eq!(clamp_opacity(-1.0), 0.0);
    assert_eq!(clamp_opacity(0.25), 0.25);
    assert_eq!(clamp_opacity(7.0), 1.0);
    assert_eq!(clamp_opacity(f64::NAN), 0.0);
}

#[test]
fn background_only_fills_the_buffer() {
    let mut c = Compositor::new(FontLibrary::empty());
    let bg = solid(4, 3, [0, 0, 255, 255]);
    let frame = c
        .render(&bg, &[], None, Canvas::new(4, 3).unwrap())
        .unwrap();
    assert_eq!((frame.width, frame.height), (4, 3));
    assert!(frame.premultiplied);
    assert_px_close(frame.pixel(0, 0), [0, 0, 255, 255]);
    assert_px_close(frame.pixel(3, 2), [0, 0, 255, 255]);
}

#[test]
fn background_is_stretched_to_the_target() {
    let mut c = Compositor::new(FontLibrary::empty());
    let bg = solid(2, 2, [10, 200, 30, 255]);
    let frame = c
        .render(&bg, &[], None, Canvas::new(16, 8).unwrap())
        .unwrap();
    assert_eq!(frame.data.len(), 16 * 8 * 4);
    assert_px_close(frame.pixel(8, 4), [10, 200, 30, 255]);
}

#[test]
fn text_without_any_font_draws_nothing() {
    let mut c = Compositor::new(FontLibrary::empty());
    let bg = solid(40, 40, [0, 0, 0, 255]);
    let frame = c
        .render(&bg, &[block_layer()], None, Canvas::new(40, 40).unwrap())
        .unwrap();
    assert_px_close(frame.pixel(20, 20), [0, 0, 0, 255]);
}

#[test]
fn empty_text_consumes_its_slot_without_drawing() {
    let mut c = Compositor::new(fixture_fonts());
    let bg = solid(40, 40, [0, 0, 0, 255]);
    let mut layer = block_layer();
    layer.text.clear();
    let frame = c
        .render(&bg, &[layer], None, Canvas::new(40, 40).unwrap())
        .unwrap();
    for y in 0..40 {
        for x in 0..40 {
            assert_px_close(frame.pixel(x, y), [0, 0, 0, 255]);
        }
    }
}

#[test]
fn zero_opacity_text_is_invisible() {
    let mut c = Compositor::new(fixture_fonts());
    let bg = solid(80, 80, [0, 0, 0, 255]);
    let mut layer = block_layer();
    layer.opacity = 0.0;
    let frame = c
        .render(&bg, &[layer], None, Canvas::new(80, 80).unwrap())
        .unwrap();
    assert_px_close(frame.pixel(40, 40), [0, 0, 0, 255]);
}

#[test]
fn block_glyph_covers_the_center() {
    let mut c = Compositor::new(fixture_fonts());
    let bg = solid(240, 160, [0, 0, 0, 255]);
    let frame = c
        .render(&bg, &[block_layer()], None, Canvas::new(240, 160).unwrap())
        .unwrap();
    let [r, g, b, a] = frame.pixel(120, 80).unwrap();
    assert!(r >= 253, "r={r}");
    assert!(g <= 2 && b <= 2, "g={g} b={b}");
    assert_eq!(a, 255);
}

#[test]
fn oversized_canvas_is_rejected() {
    let mut c = Compositor::new(FontLibrary::empty());
    let bg = solid(1, 1, [0, 0, 0, 255]);
    let err = c
        .render(
            &bg,
            &[],
            None,
            Canvas {
                width: 70_000,
                height: 1,
            },
        )
        .unwrap_err();
    assert!(matches!(err, TextBehindError::Validation(_)));
}

fn render_on_black(layers: &[TextLayer]) -> FrameRGBA {
    let mut c = Compositor::new(fixture_fonts());
    let bg = solid(240, 160, [0, 0, 0, 255]);
    c.render(&bg, layers, None, Canvas::new(240, 160).unwrap())
        .unwrap()
}

#[test]
fn later_text_layer_draws_over_earlier_one() {
    let red = block_layer();
    let mut blue = block_layer();
    blue.id = LayerId(2);
    blue.color = "#0000ff".into();

    let frame = render_on_black(&[red.clone(), blue.clone()]);
    assert_px_close(frame.pixel(120, 80), [0, 0, 255, 255]);

    let frame = render_on_black(&[blue, red]);
    assert_px_close(frame.pixel(120, 80), [255, 0, 0, 255]);
}

#[test]
fn offsets_move_the_text_anchor() {
    let mut layer = block_layer();
    layer.font_size_units = 5.0;
    layer.left = 25.0;
    layer.top = 25.0;
    let frame = render_on_black(&[layer]);

    // left=25 is right of center, top=25 is above it.
    assert_px_close(frame.pixel(180, 40), [255, 0, 0, 255]);
    assert_px_close(frame.pixel(120, 80), [0, 0, 0, 255]);
    assert_px_close(frame.pixel(60, 40), [0, 0, 0, 255]);
    assert_px_close(frame.pixel(180, 120), [0, 0, 0, 255]);
}

#[test]
fn quarter_turn_stands_wide_text_upright() {
    let mut layer = block_layer();
    layer.text = "\u{2588}\u{2588}\u{2588}".to_string();
    layer.font_size_units = 5.0;

    let flat = render_on_black(std::slice::from_ref(&layer));
    assert_px_close(flat.pixel(92, 80), [255, 0, 0, 255]);
    assert_px_close(flat.pixel(120, 52), [0, 0, 0, 255]);

    layer.rotation = 90.0;
    let turned = render_on_black(&[layer]);
    assert_px_close(turned.pixel(120, 52), [255, 0, 0, 255]);
    assert_px_close(turned.pixel(120, 108), [255, 0, 0, 255]);
    assert_px_close(turned.pixel(92, 80), [0, 0, 0, 255]);
    assert_px_close(turned.pixel(148, 80), [0, 0, 0, 255]);
}

#[test]
fn negative_font_size_skips_the_layer() {
    let mut layer = block_layer();
    layer.font_size_units = -1000.0;
    assert!(export_font_size_px(layer.font_size_units) > 0.0);

    let frame = render_on_black(&[layer]);
    assert_px_close(frame.pixel(120, 80), [0, 0, 0, 255]);
}
