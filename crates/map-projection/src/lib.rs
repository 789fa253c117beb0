//! Map synchronization layer.
//!
//! Projects domain state into the three renderable surfaces a map
//! frontend draws, without ever linking against a renderer:
//!
//! ```text
//! FeatureCollection ──to_renderable──▶ committed layer  (src:{layer})
//!         │
//!         └─build_version_index──▶ id -> version annotations
//!
//! EditState ──render_edit_overlay──▶ draft polygon      (src:edit:draft)
//!                                    draft vertices     (src:edit:vertices)
//! ```
//!
//! The draft and its rendered overlay must never desynchronize: the
//! overlay is recomputed from `EditState` alone, so pushing the state
//! through `sync_overlay` after every transition is sufficient.

mod overlay;
mod renderable;
mod surface;
mod vertex;

pub use overlay::{render_edit_overlay, EditOverlay, RING_PROPERTY, VERTEX_PROPERTY};
pub use renderable::{
    build_version_index, to_renderable, RenderCollection, RenderFeature, ID_PROPERTY,
    VERSION_PROPERTY,
};
pub use surface::{
    ensure_layer, layer_key, outline_key, set_layer_pair_visibility, source_id, sync_committed,
    sync_overlay, InMemorySurface, LayerKind, LayerSpec, MapSurface, DRAFT_LAYER, DRAFT_SOURCE,
    VERTEX_LAYER, VERTEX_SOURCE,
};
pub use vertex::{move_vertex, ProjectionError};
