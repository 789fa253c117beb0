//! Renderer-facing surface seam.
//!
//! The renderer itself is an external collaborator; this module owns
//! the source/layer id scheme and the idempotent bookkeeping so the
//! committed layers and the draft overlay cannot drift apart.
//! `InMemorySurface` implements the seam for tests and headless use.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use edit_session::EditState;
use geoedit_types::{FeatureCollection, Layer};

use crate::overlay::render_edit_overlay;
use crate::renderable::{build_version_index, to_renderable, RenderCollection};

pub const DRAFT_SOURCE: &str = "src:edit:draft";
pub const DRAFT_LAYER: &str = "layer:edit:draft";
pub const VERTEX_SOURCE: &str = "src:edit:vertices";
pub const VERTEX_LAYER: &str = "layer:edit:vertices";

pub fn source_id(layer_id: &str) -> String {
    format!("src:{layer_id}")
}

pub fn layer_key(layer_id: &str) -> String {
    format!("layer:{layer_id}")
}

pub fn outline_key(layer_id: &str) -> String {
    format!("layer:{layer_id}:outline")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Circle,
    Line,
    Fill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
}

/// Minimal renderer contract. Implementations must treat `add_source`
/// / `add_layer` for an existing id as a no-op, never an error, and
/// must ignore `set_source_data` / `set_layer_visibility` for unknown
/// ids.
pub trait MapSurface {
    fn has_source(&self, source_id: &str) -> bool;
    fn add_source(&mut self, source_id: &str);
    fn has_layer(&self, layer_id: &str) -> bool;
    fn add_layer(&mut self, spec: LayerSpec);
    fn set_source_data(&mut self, source_id: &str, data: RenderCollection);
    fn set_layer_visibility(&mut self, layer_id: &str, visible: bool);
}

/// Make sure a committed layer's source and render layers exist.
/// Point layers render as circles, line layers as lines, everything
/// else as a fill with a line outline - the same dispatch the server's
/// `geometryType` metadata implies.
pub fn ensure_layer(surface: &mut dyn MapSurface, layer: &Layer) {
    let source = source_id(&layer.id);
    if !surface.has_source(&source) {
        surface.add_source(&source);
    }
    let key = layer_key(&layer.id);
    if surface.has_layer(&key) {
        return;
    }
    if layer.geometry_type.contains("Point") {
        surface.add_layer(LayerSpec {
            id: key,
            source,
            kind: LayerKind::Circle,
        });
    } else if layer.geometry_type.contains("Line") {
        surface.add_layer(LayerSpec {
            id: key,
            source,
            kind: LayerKind::Line,
        });
    } else {
        surface.add_layer(LayerSpec {
            id: key,
            source: source.clone(),
            kind: LayerKind::Fill,
        });
        surface.add_layer(LayerSpec {
            id: outline_key(&layer.id),
            source,
            kind: LayerKind::Line,
        });
    }
}

/// Toggle a layer and, for polygon layers, its outline companion.
pub fn set_layer_pair_visibility(surface: &mut dyn MapSurface, layer: &Layer, visible: bool) {
    surface.set_layer_visibility(&layer_key(&layer.id), visible);
    if layer.geometry_type.contains("Polygon") {
        surface.set_layer_visibility(&outline_key(&layer.id), visible);
    }
}

/// Push a freshly fetched viewport collection to the committed
/// surface and return the rebuilt version index.
pub fn sync_committed(
    surface: &mut dyn MapSurface,
    layer: &Layer,
    collection: &FeatureCollection,
) -> HashMap<String, u64> {
    ensure_layer(surface, layer);
    surface.set_source_data(&source_id(&layer.id), to_renderable(collection));
    build_version_index(collection)
}

/// Mirror the edit state onto the draft overlays. `Idle` clears both.
pub fn sync_overlay(surface: &mut dyn MapSurface, state: &EditState) {
    ensure_overlay_layers(surface);
    let overlay = render_edit_overlay(state);
    surface.set_source_data(DRAFT_SOURCE, overlay.polygon);
    surface.set_source_data(VERTEX_SOURCE, overlay.vertices);
}

fn ensure_overlay_layers(surface: &mut dyn MapSurface) {
    let overlays = [
        (DRAFT_SOURCE, DRAFT_LAYER, LayerKind::Fill),
        (VERTEX_SOURCE, VERTEX_LAYER, LayerKind::Circle),
    ];
    for (source, layer, kind) in overlays {
        if !surface.has_source(source) {
            surface.add_source(source);
        }
        if !surface.has_layer(layer) {
            surface.add_layer(LayerSpec {
                id: layer.to_string(),
                source: source.to_string(),
                kind,
            });
        }
    }
}

/// In-memory surface for tests and headless use. BTree maps keep
/// iteration deterministic.
#[derive(Debug, Clone, Default)]
pub struct InMemorySurface {
    sources: BTreeMap<String, RenderCollection>,
    layers: BTreeMap<String, LayerSpec>,
    hidden: BTreeSet<String>,
}

impl InMemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_data(&self, source_id: &str) -> Option<&RenderCollection> {
        self.sources.get(source_id)
    }

    pub fn layer(&self, layer_id: &str) -> Option<&LayerSpec> {
        self.layers.get(layer_id)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn is_visible(&self, layer_id: &str) -> bool {
        !self.hidden.contains(layer_id)
    }
}

impl MapSurface for InMemorySurface {
    fn has_source(&self, source_id: &str) -> bool {
        self.sources.contains_key(source_id)
    }

    fn add_source(&mut self, source_id: &str) {
        self.sources.entry(source_id.to_string()).or_default();
    }

    fn has_layer(&self, layer_id: &str) -> bool {
        self.layers.contains_key(layer_id)
    }

    fn add_layer(&mut self, spec: LayerSpec) {
        self.layers.entry(spec.id.clone()).or_insert(spec);
    }

    fn set_source_data(&mut self, source_id: &str, data: RenderCollection) {
        if let Some(slot) = self.sources.get_mut(source_id) {
            *slot = data;
        }
    }

    fn set_layer_visibility(&mut self, layer_id: &str, visible: bool) {
        if !self.layers.contains_key(layer_id) {
            return;
        }
        if visible {
            self.hidden.remove(layer_id);
        } else {
            self.hidden.insert(layer_id.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoedit_types::{Feature, Geometry};
    use pretty_assertions::assert_eq;
    use serde_json::Map;

    fn polygon_layer() -> Layer {
        Layer {
            id: "l1".into(),
            name: "parcels".into(),
            title: "Parcels".into(),
            geometry_type: "Polygon".into(),
            srid: 4326,
        }
    }

    fn collection() -> FeatureCollection {
        FeatureCollection {
            features: vec![Feature {
                id: "f1".into(),
                version: 4,
                geometry: Geometry::polygon(vec![vec![
                    [0.0, 0.0],
                    [1.0, 0.0],
                    [1.0, 1.0],
                    [0.0, 0.0],
                ]]),
                properties: Map::new(),
            }],
        }
    }

    #[test]
    fn polygon_layer_gets_fill_and_outline() {
        let mut surface = InMemorySurface::new();
        ensure_layer(&mut surface, &polygon_layer());
        assert_eq!(surface.layer("layer:l1").unwrap().kind, LayerKind::Fill);
        assert_eq!(
            surface.layer("layer:l1:outline").unwrap().kind,
            LayerKind::Line
        );
    }

    #[test]
    fn point_layer_gets_a_circle() {
        let mut surface = InMemorySurface::new();
        let layer = Layer {
            geometry_type: "MultiPoint".into(),
            ..polygon_layer()
        };
        ensure_layer(&mut surface, &layer);
        assert_eq!(surface.layer("layer:l1").unwrap().kind, LayerKind::Circle);
        assert!(surface.layer("layer:l1:outline").is_none());
    }

    #[test]
    fn ensure_layer_is_idempotent_and_preserves_data() {
        let mut surface = InMemorySurface::new();
        let layer = polygon_layer();
        let index = sync_committed(&mut surface, &layer, &collection());
        assert_eq!(index["f1"], 4);
        assert_eq!(surface.source_data("src:l1").unwrap().len(), 1);

        // a second ensure must not reset anything
        ensure_layer(&mut surface, &layer);
        assert_eq!(surface.layer_count(), 2);
        assert_eq!(surface.source_data("src:l1").unwrap().len(), 1);
    }

    #[test]
    fn visibility_toggles_the_outline_with_the_fill() {
        let mut surface = InMemorySurface::new();
        let layer = polygon_layer();
        ensure_layer(&mut surface, &layer);
        set_layer_pair_visibility(&mut surface, &layer, false);
        assert!(!surface.is_visible("layer:l1"));
        assert!(!surface.is_visible("layer:l1:outline"));
        set_layer_pair_visibility(&mut surface, &layer, true);
        assert!(surface.is_visible("layer:l1"));
    }

    #[test]
    fn overlay_sync_clears_on_idle() {
        let mut surface = InMemorySurface::new();
        sync_overlay(&mut surface, &EditState::Idle);
        assert!(surface.source_data(DRAFT_SOURCE).unwrap().is_empty());
        assert!(surface.source_data(VERTEX_SOURCE).unwrap().is_empty());
        assert!(surface.has_layer(DRAFT_LAYER));
        assert!(surface.has_layer(VERTEX_LAYER));
    }
}
