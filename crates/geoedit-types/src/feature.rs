//! Server-owned domain objects.
//!
//! Wire payloads carry GeoJSON-style `"type"` tags and camelCase field
//! names; the `wire` module enforces the tags, these structs hold the
//! decoded result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::Geometry;

/// A versioned geographic feature. Immutable once decoded - every
/// successful server write produces a feature with a bumped version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    pub id: String,
    pub version: u64,
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// Layer metadata from `GET /api/v1/layers`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub title: String,
    pub geometry_type: String,
    pub srid: i32,
}

/// Acknowledgement body of a successful feature delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub feature_id: String,
}

/// 409 body: the caller's version token no longer matches the stored
/// version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionMismatch {
    pub feature_id: String,
    pub request_version: u64,
    pub current_version: u64,
    pub message: String,
}
