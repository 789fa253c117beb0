//! Polygon structural validation.
//!
//! Runs before a draft mutation is accepted and before a save is
//! issued; the server repeats equivalent checks and answers 422 when
//! they fail, so a rejection here saves a round trip.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use geoedit_types::{Geometry, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    InvalidCoordinates,
    RingNotClosed,
    RingTooShort,
    GeomNotPolygon,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct GeometryInvalid {
    pub code: ValidationCode,
    pub message: String,
}

impl GeometryInvalid {
    pub fn new(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Validate a draft polygon. Checks run in a fixed order and the first
/// failing rule wins:
///
/// 1. the geometry must be a polygon;
/// 2. the ring list must be non-empty;
/// 3. per ring: at least 4 positions, closed (first == last), every
///    coordinate finite with lng in [-180, 180] and lat in [-90, 90].
///
/// Pure and total - never panics on any well-typed geometry.
pub fn validate_polygon(geometry: &Geometry) -> Result<(), GeometryInvalid> {
    let rings = geometry.as_polygon().ok_or_else(|| {
        GeometryInvalid::new(ValidationCode::GeomNotPolygon, "geometry is not a polygon")
    })?;
    if rings.is_empty() {
        return Err(GeometryInvalid::new(
            ValidationCode::InvalidCoordinates,
            "a polygon must contain at least one ring",
        ));
    }
    for ring in rings {
        if ring.len() < 4 {
            return Err(GeometryInvalid::new(
                ValidationCode::RingTooShort,
                "a polygon ring must contain at least 4 points",
            ));
        }
        if ring.first() != ring.last() {
            return Err(GeometryInvalid::new(
                ValidationCode::RingNotClosed,
                "every polygon ring must be closed",
            ));
        }
        if !ring.iter().all(is_valid_position) {
            return Err(GeometryInvalid::new(
                ValidationCode::InvalidCoordinates,
                "polygon contains coordinates outside the valid range",
            ));
        }
    }
    Ok(())
}

fn is_valid_position(position: &Position) -> bool {
    position.iter().all(|c| c.is_finite())
        && (-180.0..=180.0).contains(&position[0])
        && (-90.0..=90.0).contains(&position[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoedit_types::Ring;

    fn closed_square() -> Geometry {
        Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 0.0],
        ]])
    }

    fn code_of(geometry: &Geometry) -> ValidationCode {
        validate_polygon(geometry).unwrap_err().code
    }

    #[test]
    fn accepts_closed_square() {
        assert!(validate_polygon(&closed_square()).is_ok());
    }

    #[test]
    fn rejects_non_polygon_geometry() {
        assert_eq!(
            code_of(&Geometry::point([0.0, 0.0])),
            ValidationCode::GeomNotPolygon
        );
    }

    #[test]
    fn rejects_empty_ring_list() {
        assert_eq!(
            code_of(&Geometry::polygon(vec![])),
            ValidationCode::InvalidCoordinates
        );
    }

    #[test]
    fn rejects_ring_with_fewer_than_four_points() {
        let geometry = Geometry::polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]);
        assert_eq!(code_of(&geometry), ValidationCode::RingTooShort);
    }

    #[test]
    fn rejects_open_ring() {
        let geometry = Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.5, 0.5],
        ]]);
        assert_eq!(code_of(&geometry), ValidationCode::RingNotClosed);
    }

    #[test]
    fn closure_is_checked_before_coordinate_range() {
        // open ring AND an out-of-range longitude - closure wins
        let geometry = Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [200.0, 0.0],
            [1.0, 1.0],
            [0.5, 0.5],
        ]]);
        assert_eq!(code_of(&geometry), ValidationCode::RingNotClosed);
    }

    #[test]
    fn rejects_longitude_out_of_range() {
        let geometry = Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [181.0, 0.0],
            [1.0, 1.0],
            [0.0, 0.0],
        ]]);
        assert_eq!(code_of(&geometry), ValidationCode::InvalidCoordinates);
    }

    #[test]
    fn rejects_latitude_out_of_range() {
        let geometry = Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [1.0, -90.5],
            [1.0, 1.0],
            [0.0, 0.0],
        ]]);
        assert_eq!(code_of(&geometry), ValidationCode::InvalidCoordinates);
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let geometry = Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [f64::INFINITY, 0.0],
            [1.0, 1.0],
            [0.0, 0.0],
        ]]);
        assert_eq!(code_of(&geometry), ValidationCode::InvalidCoordinates);
    }

    #[test]
    fn every_ring_is_checked() {
        let hole: Ring = vec![[0.1, 0.1], [0.2, 0.1], [0.3, 0.3]];
        let geometry = Geometry::polygon(vec![
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]],
            hole,
        ]);
        assert_eq!(code_of(&geometry), ValidationCode::RingTooShort);
    }
}
