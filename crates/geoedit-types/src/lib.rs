//! Shared domain types for the geoedit core.
//!
//! Everything the other crates exchange lives here:
//! - `Geometry` / `Position` / `Ring` - GeoJSON-compatible geometry
//! - `Feature`, `FeatureCollection`, `Layer` - server-owned domain objects
//! - `Bbox` - validated viewport bounding box
//! - `wire` - strict decoders for untrusted server payloads
//!
//! Domain objects are immutable once decoded; a new server version of a
//! feature is a distinct value, never an in-place mutation.

mod bbox;
mod feature;
mod geometry;
pub mod wire;

pub use bbox::{Bbox, BboxError};
pub use feature::{DeleteAck, Feature, FeatureCollection, Layer, VersionMismatch};
pub use geometry::{Geometry, Position, Ring};
pub use wire::WireError;
