//! Pure operations over the text layer sequence.
//!
//! Every function takes the current sequence and returns the next one; nothing else is touched.

use std::collections::HashSet;

use super::model::{LayerId, TextAttr, TextLayer};

/// Id that a layer appended to `layers` receives: one past the largest id, or 1 if empty.
///
/// When the largest id is `u32::MAX` the lowest unused id is handed out instead.
pub fn next_layer_id(layers: &[TextLayer]) -> LayerId {
    let max = layers.iter().map(|l| l.id.0).max().unwrap_or(0);
    if let Some(next) = max.checked_add(1) {
        return LayerId(next);
    }
    let used: HashSet<u32> = layers.iter().map(|l| l.id.0).collect();
    // A sequence cannot hold u32::MAX layers, so a free id always exists.
    LayerId((1..u32::MAX).find(|id| !used.contains(id)).unwrap_or(0))
}

/// A default layer whose id does not collide with `existing`.
pub fn create_text_layer(existing: &[TextLayer]) -> TextLayer {
    TextLayer::with_defaults(next_layer_id(existing))
}

/// Append a default layer.
pub fn add_text_layer(mut layers: Vec<TextLayer>) -> Vec<TextLayer> {
    let layer = create_text_layer(&layers);
    layers.push(layer);
    layers
}

/// Append a copy of `source` with a fresh id.
pub fn duplicate_text_layer(mut layers: Vec<TextLayer>, source: &TextLayer) -> Vec<TextLayer> {
    let mut copy = source.clone();
    copy.id = next_layer_id(&layers);
    layers.push(copy);
    layers
}

/// Drop every layer with `id`.
pub fn remove_text_layer(mut layers: Vec<TextLayer>, id: LayerId) -> Vec<TextLayer> {
    layers.retain(|l| l.id != id);
    layers
}

/// Apply `attr` to the layer with `id`. Unknown ids leave the sequence unchanged.
pub fn update_attribute(
    mut layers: Vec<TextLayer>,
    id: LayerId,
    attr: &TextAttr,
) -> Vec<TextLayer> {
    if let Some(layer) = layers.iter_mut().find(|l| l.id == id) {
        attr.apply_to(layer);
    }
    layers
}

#[cfg(test)]
#[path = "../../tests/unit/layers/ops.rs"]
mod tests;
