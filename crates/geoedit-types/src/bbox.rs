//! Viewport bounding box.
//!
//! Construction validates the same rules the server applies to the
//! `bbox` query parameter, so an invalid viewport is rejected before a
//! request is ever issued.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BboxError {
    #[error("bbox must be four comma-separated numbers")]
    Malformed,

    #[error("bbox coordinates must be finite numbers")]
    NotFinite,

    #[error("longitude must be between -180 and 180")]
    LongitudeOutOfRange,

    #[error("latitude must be between -90 and 90")]
    LatitudeOutOfRange,

    #[error("west must be less than east")]
    WestNotBelowEast,

    #[error("south must be less than north")]
    SouthNotBelowNorth,
}

/// `[west, south, east, north]` viewport bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bbox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, BboxError> {
        if ![west, south, east, north].iter().all(|c| c.is_finite()) {
            return Err(BboxError::NotFinite);
        }
        if !(-180.0..=180.0).contains(&west) || !(-180.0..=180.0).contains(&east) {
            return Err(BboxError::LongitudeOutOfRange);
        }
        if !(-90.0..=90.0).contains(&south) || !(-90.0..=90.0).contains(&north) {
            return Err(BboxError::LatitudeOutOfRange);
        }
        if west >= east {
            return Err(BboxError::WestNotBelowEast);
        }
        if south >= north {
            return Err(BboxError::SouthNotBelowNorth);
        }
        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// Query-parameter form, `west,south,east,north`.
    pub fn to_query(&self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }

    /// True when both boxes agree within `eps` on every edge. Used to
    /// suppress refetches for sub-pixel viewport jitter.
    pub fn approx_eq(&self, other: &Bbox, eps: f64) -> bool {
        (self.west - other.west).abs() < eps
            && (self.south - other.south).abs() < eps
            && (self.east - other.east).abs() < eps
            && (self.north - other.north).abs() < eps
    }
}

impl FromStr for Bbox {
    type Err = BboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(BboxError::Malformed);
        }
        let mut coords = [0.0f64; 4];
        for (slot, part) in coords.iter_mut().zip(&parts) {
            *slot = part.trim().parse().map_err(|_| BboxError::Malformed)?;
        }
        Bbox::new(coords[0], coords[1], coords[2], coords[3])
    }
}

impl fmt::Display for Bbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4},{:.4},{:.4},{:.4}",
            self.west, self.south, self.east, self.north
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn valid_bbox_round_trips_through_query() {
        let bbox = Bbox::new(30.0, 59.0, 31.0, 60.0).unwrap();
        assert_eq!(bbox.to_query(), "30,59,31,60");
        assert_eq!("30,59,31,60".parse::<Bbox>().unwrap(), bbox);
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        assert_eq!(
            Bbox::new(-181.0, 0.0, 10.0, 1.0),
            Err(BboxError::LongitudeOutOfRange)
        );
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        assert_eq!(
            Bbox::new(0.0, -91.0, 10.0, 1.0),
            Err(BboxError::LatitudeOutOfRange)
        );
    }

    #[test]
    fn rejects_empty_spans() {
        assert_eq!(
            Bbox::new(10.0, 0.0, 10.0, 1.0),
            Err(BboxError::WestNotBelowEast)
        );
        assert_eq!(
            Bbox::new(0.0, 5.0, 10.0, 5.0),
            Err(BboxError::SouthNotBelowNorth)
        );
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        assert_eq!(
            Bbox::new(f64::NAN, 0.0, 1.0, 1.0),
            Err(BboxError::NotFinite)
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("1,2,3".parse::<Bbox>(), Err(BboxError::Malformed));
        assert_eq!("a,b,c,d".parse::<Bbox>(), Err(BboxError::Malformed));
    }

    #[test]
    fn approx_eq_tolerates_jitter() {
        let a = Bbox::new(30.0, 59.0, 31.0, 60.0).unwrap();
        let b = Bbox::new(30.00001, 59.0, 31.0, 60.0).unwrap();
        assert!(a.approx_eq(&b, 1e-4));
        assert!(!a.approx_eq(&b, 1e-6));
    }
}
