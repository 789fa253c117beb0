//! GeoJSON-compatible geometry model.
//!
//! The wire discriminates geometries with a `"type"` tag; the enum keeps
//! that tag so non-polygon geometries coming out of a layer can still be
//! represented, displayed, and deleted even though only polygons are
//! editable.

use serde::{Deserialize, Serialize};

/// A single coordinate pair, `[lng, lat]`.
pub type Position = [f64; 2];

/// A linear ring; closed rings repeat the first position at the end.
pub type Ring = Vec<Position>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Position,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    Polygon {
        coordinates: Vec<Ring>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bbox: Option<Vec<f64>>,
    },
}

impl Geometry {
    /// Polygon from bare rings, no cached bbox.
    pub fn polygon(coordinates: Vec<Ring>) -> Self {
        Geometry::Polygon {
            coordinates,
            bbox: None,
        }
    }

    pub fn point(coordinates: Position) -> Self {
        Geometry::Point { coordinates }
    }

    /// The wire-level `"type"` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::LineString { .. } => "LineString",
            Geometry::Polygon { .. } => "Polygon",
        }
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self, Geometry::Polygon { .. })
    }

    /// Polygon rings, or `None` for any other geometry type.
    pub fn as_polygon(&self) -> Option<&[Ring]> {
        match self {
            Geometry::Polygon { coordinates, .. } => Some(coordinates),
            _ => None,
        }
    }
}
