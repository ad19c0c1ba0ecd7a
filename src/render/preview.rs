//! Declarative preview scene, renderable as an HTML fragment.
//!
//! The scene mirrors what [`crate::Compositor::render`] draws: background, text layers in
//! sequence order, then the foreground cutout, each text element placed with
//! [`PreviewGeometry`].

use std::fmt::Write as _;

use crate::assets::color::CssColor;
use crate::layers::model::{LayerId, Project, TextLayer};
use crate::transform::geometry::PreviewGeometry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Which image layer an image element shows.
pub enum ImageRole {
    /// Uploaded photo.
    Background,
    /// Segmented subject.
    Foreground,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// CSS-level styling of one preview text element.
pub struct PreviewTextStyle {
    /// Placement and size.
    pub geometry: PreviewGeometry,
    /// CSS `font-family`.
    pub font_family: String,
    /// CSS `font-weight`.
    pub font_weight: u16,
    /// CSS `color`, as entered.
    pub color: String,
    /// CSS `opacity`.
    pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// One absolutely positioned element of the preview.
pub enum PreviewElement {
    /// Full-size image.
    Image {
        /// Background or foreground.
        role: ImageRole,
        /// Image URL or path.
        source: String,
    },
    /// Text placed by its center.
    Text {
        /// Layer the element renders.
        id: LayerId,
        /// Displayed text.
        text: String,
        /// Styling.
        style: PreviewTextStyle,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Ordered preview elements over a container with the background's aspect ratio.
pub struct PreviewScene {
    /// Background natural width.
    pub width: u32,
    /// Background natural height.
    pub height: u32,
    /// Whether segmentation is still pending (text and cutout are hidden).
    pub loading: bool,
    /// Elements, bottom first.
    pub elements: Vec<PreviewElement>,
}

impl PreviewScene {
    /// Scene for `project`, or `None` without a background.
    pub fn build(project: &Project, setup_done: bool) -> Option<Self> {
        let background = project.background.as_ref()?;
        let mut elements = vec![PreviewElement::Image {
            role: ImageRole::Background,
            source: background.source.clone(),
        }];

        if setup_done {
            elements.extend(project.text_layers.iter().map(text_element));
            if let Some(fg) = &project.foreground {
                elements.push(PreviewElement::Image {
                    role: ImageRole::Foreground,
                    source: fg.source.clone(),
                });
            }
        }

        Some(Self {
            width: background.natural_width(),
            height: background.natural_height(),
            loading: !setup_done,
            elements,
        })
    }

    /// Point image elements of `role` at `source` (e.g. a file written next to the HTML).
    pub fn set_image_source(&mut self, role: ImageRole, source: impl Into<String>) {
        let source = source.into();
        for el in &mut self.elements {
            if let PreviewElement::Image { role: r, source: s } = el
                && *r == role
            {
                s.clone_from(&source);
            }
        }
    }

    /// Serialize as a self-contained HTML fragment.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "<div class=\"text-behind-preview\" style=\"position: relative; width: 100%; \
             aspect-ratio: {} / {}; overflow: hidden;\">",
            self.width, self.height
        );

        for el in &self.elements {
            match el {
                PreviewElement::Image { role, source } => {
                    let alt = match role {
                        ImageRole::Background => "Uploaded",
                        ImageRole::Foreground => "Removed bg",
                    };
                    let _ = writeln!(
                        out,
                        "  <img src=\"{}\" alt=\"{alt}\" style=\"position: absolute; top: 0; \
                         left: 0; width: 100%; height: 100%; object-fit: fill;\">",
                        escape_html(source)
                    );
                }
                PreviewElement::Text { id, text, style } => {
                    let g = &style.geometry;
                    let _ = writeln!(
                        out,
                        "  <div data-layer-id=\"{id}\" style=\"position: absolute; top: {}%; \
                         left: {}%; transform: {}; color: {}; text-align: center; \
                         white-space: pre; font-size: {}%; font-weight: {}; font-family: {}; \
                         opacity: {};\">{}</div>",
                        g.top_percent,
                        g.left_percent,
                        g.css_transform(),
                        css_color(&style.color),
                        g.font_size_percent,
                        style.font_weight,
                        escape_html(&css_string(&style.font_family)),
                        style.opacity,
                        escape_html(text)
                    );
                }
            }
        }

        if self.loading {
            out.push_str("  <span>Loading, please wait</span>\n");
        }
        out.push_str("</div>\n");
        out
    }
}

fn text_element(layer: &TextLayer) -> PreviewElement {
    PreviewElement::Text {
        id: layer.id,
        text: layer.text.clone(),
        style: PreviewTextStyle {
            geometry: PreviewGeometry::for_layer(layer),
            font_family: layer.font_family.clone(),
            font_weight: layer.font_weight,
            color: layer.color.as_str().to_string(),
            opacity: layer.opacity,
        },
    }
}

/// Resolved `rgba()` for `color`, white when it does not parse (as in the export).
fn css_color(color: &str) -> String {
    let [r, g, b, a] = CssColor::new(color)
        .to_rgba8()
        .unwrap_or([255, 255, 255, 255]);
    format!("rgba({r}, {g}, {b}, {})", f64::from(a) / 255.0)
}

/// Double-quoted CSS string literal.
fn css_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' | '\r' | '\x0c' => {
                let _ = write!(out, "\\{:x} ", u32::from(c));
            }
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;
