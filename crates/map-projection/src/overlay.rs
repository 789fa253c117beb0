//! Draft overlay projection.
//!
//! Two surfaces derived from the edit state: the draft polygon itself
//! and one draggable point per ring vertex. Both clear to empty the
//! moment the session ends.

use serde_json::{Map, Value};

use edit_session::EditState;
use geoedit_types::Geometry;

use crate::renderable::{RenderCollection, RenderFeature};

/// Vertex-feature attribute: index of the ring within the polygon.
pub const RING_PROPERTY: &str = "ring";
/// Vertex-feature attribute: index of the vertex within its ring.
pub const VERTEX_PROPERTY: &str = "i";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditOverlay {
    pub polygon: RenderCollection,
    pub vertices: RenderCollection,
}

impl EditOverlay {
    pub fn empty() -> Self {
        Self::default()
    }
}

pub fn render_edit_overlay(state: &EditState) -> EditOverlay {
    let Some(session) = state.session() else {
        return EditOverlay::empty();
    };
    let draft = &session.draft;
    EditOverlay {
        polygon: RenderCollection::single(RenderFeature {
            geometry: draft.geometry.clone(),
            properties: draft.properties.clone(),
        }),
        vertices: RenderCollection {
            features: vertex_features(&draft.geometry),
        },
    }
}

/// One point feature per ring vertex, tagged `{ring, i}` so a drag
/// handler can address the vertex later. The duplicated closing vertex
/// gets no handle.
fn vertex_features(geometry: &Geometry) -> Vec<RenderFeature> {
    let Some(rings) = geometry.as_polygon() else {
        return Vec::new();
    };
    let mut features = Vec::new();
    for (ring_index, ring) in rings.iter().enumerate() {
        let handles = ring.len().saturating_sub(1);
        for (vertex_index, position) in ring.iter().take(handles).enumerate() {
            let mut properties = Map::new();
            properties.insert(RING_PROPERTY.into(), Value::from(ring_index as u64));
            properties.insert(VERTEX_PROPERTY.into(), Value::from(vertex_index as u64));
            features.push(RenderFeature {
                geometry: Geometry::point(*position),
                properties,
            });
        }
    }
    features
}
