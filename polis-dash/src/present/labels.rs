//! Human-readable zoom labels

use crate::dataset::LabelLayers;

/// Convert raw layers (finest first) to display labels (coarsest first)
///
/// Display level `n` counts from 1 at the coarsest layer, so the last raw
/// layer becomes `Zoom1` and the first raw layer becomes `ZoomN`.
pub fn humanize_layers(layers: &LabelLayers) -> Vec<Vec<String>> {
    layers
        .layers()
        .iter()
        .rev()
        .enumerate()
        .map(|(idx, layer)| {
            let zoom_level = idx + 1;
            layer
                .iter()
                .map(|group_id| format!("Zoom{}:Group{}", zoom_level, group_id))
                .collect()
        })
        .collect()
}
