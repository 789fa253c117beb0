//! Committed-feature render projection.
//!
//! Renderers key on geometry plus flat attributes only, so the domain
//! id and version ride along as injected properties.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use geoedit_types::{Feature, FeatureCollection, Geometry};

/// Injected attribute carrying the domain feature id.
pub const ID_PROPERTY: &str = "__id";
/// Injected attribute carrying the last observed server version.
pub const VERSION_PROPERTY: &str = "__version";

/// A render-ready GeoJSON feature. Serialize-only: render output
/// flows outward to the renderer, never back in.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename = "Feature")]
pub struct RenderFeature {
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

/// A render-ready GeoJSON feature collection, suitable as source data
/// for a map renderer.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct RenderCollection {
    pub features: Vec<RenderFeature>,
}

impl RenderCollection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(feature: RenderFeature) -> Self {
        Self {
            features: vec![feature],
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

pub fn to_renderable(collection: &FeatureCollection) -> RenderCollection {
    RenderCollection {
        features: collection.features.iter().map(render_feature).collect(),
    }
}

fn render_feature(feature: &Feature) -> RenderFeature {
    let mut properties = feature.properties.clone();
    properties.insert(ID_PROPERTY.to_string(), Value::String(feature.id.clone()));
    properties.insert(VERSION_PROPERTY.to_string(), Value::from(feature.version));
    RenderFeature {
        geometry: feature.geometry.clone(),
        properties,
    }
}

/// Id -> last observed version for the current viewport collection.
/// Rebuilt wholesale on every fetch - incremental patching would leak
/// stale entries after deletes. Annotation only; the edit session's
/// own version token is what gates writes.
pub fn build_version_index(collection: &FeatureCollection) -> HashMap<String, u64> {
    collection
        .features
        .iter()
        .map(|feature| (feature.id.clone(), feature.version))
        .collect()
}
