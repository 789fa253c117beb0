//! Vertex-drag mutation helper.

use thiserror::Error;

use geoedit_types::{Geometry, Ring};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("geometry is not a polygon")]
    NotAPolygon,

    #[error("ring index {0} out of range")]
    RingOutOfRange(usize),

    #[error("vertex index {0} out of range")]
    VertexOutOfRange(usize),
}

/// Return a new polygon with the addressed vertex moved to
/// `[lng, lat]`; the input is never mutated. Moving vertex 0 also
/// moves the duplicated closing vertex, keeping the ring closed. Any
/// cached bbox is stale after a move and is dropped.
pub fn move_vertex(
    geometry: &Geometry,
    ring: usize,
    vertex: usize,
    lng: f64,
    lat: f64,
) -> Result<Geometry, ProjectionError> {
    let rings = geometry.as_polygon().ok_or(ProjectionError::NotAPolygon)?;
    let target = rings.get(ring).ok_or(ProjectionError::RingOutOfRange(ring))?;
    if vertex >= target.len() {
        return Err(ProjectionError::VertexOutOfRange(vertex));
    }
    let mut coordinates: Vec<Ring> = rings.to_vec();
    coordinates[ring][vertex] = [lng, lat];
    if vertex == 0 {
        let closing = coordinates[ring].len() - 1;
        coordinates[ring][closing] = [lng, lat];
    }
    Ok(Geometry::polygon(coordinates))
}
