//! Wire-contract guards.
//!
//! Strict decoders over untrusted, already-parsed JSON. A payload that
//! fails a guard never enters the domain model; guards reject, they do
//! not coerce or repair. Transport failures are a different error
//! category and are handled by the client crate.

use serde_json::Value;
use thiserror::Error;

use crate::feature::{DeleteAck, Feature, FeatureCollection, Layer, VersionMismatch};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("unexpected server payload shape: {0}")]
    UnexpectedShape(&'static str),
}

fn shape(what: &'static str) -> WireError {
    WireError::UnexpectedShape(what)
}

/// Decode a single feature: `"type": "Feature"` tag, string id,
/// integral version, object geometry and properties.
pub fn decode_feature(raw: &Value) -> Result<Feature, WireError> {
    let body = raw.as_object().ok_or(shape("feature is not an object"))?;
    if body.get("type").and_then(Value::as_str) != Some("Feature") {
        return Err(shape("missing \"Feature\" tag"));
    }
    let id = body
        .get("id")
        .and_then(Value::as_str)
        .ok_or(shape("feature id must be a string"))?
        .to_string();
    let version = body
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(shape("feature version must be a non-negative integer"))?;
    let geometry = body
        .get("geometry")
        .filter(|g| g.is_object())
        .ok_or(shape("feature geometry must be an object"))?;
    let geometry =
        serde_json::from_value(geometry.clone()).map_err(|_| shape("unknown geometry"))?;
    let properties = body
        .get("properties")
        .and_then(Value::as_object)
        .ok_or(shape("feature properties must be an object"))?
        .clone();
    Ok(Feature {
        id,
        version,
        geometry,
        properties,
    })
}

pub fn decode_feature_collection(raw: &Value) -> Result<FeatureCollection, WireError> {
    let body = raw
        .as_object()
        .ok_or(shape("feature collection is not an object"))?;
    if body.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(shape("missing \"FeatureCollection\" tag"));
    }
    let features = body
        .get("features")
        .and_then(Value::as_array)
        .ok_or(shape("features must be an array"))?
        .iter()
        .map(decode_feature)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FeatureCollection { features })
}

/// Unwrap the `{ "feature": ... }` envelope of a successful patch.
pub fn decode_patch_response(raw: &Value) -> Result<Feature, WireError> {
    let body = raw
        .as_object()
        .ok_or(shape("patch response is not an object"))?;
    let feature = body
        .get("feature")
        .ok_or(shape("patch response is missing \"feature\""))?;
    decode_feature(feature)
}

pub fn decode_delete_ack(raw: &Value) -> Result<DeleteAck, WireError> {
    let body = raw
        .as_object()
        .ok_or(shape("delete ack is not an object"))?;
    if body.get("status").and_then(Value::as_str) != Some("deleted") {
        return Err(shape("delete ack status must be \"deleted\""));
    }
    let feature_id = body
        .get("featureId")
        .and_then(Value::as_str)
        .ok_or(shape("delete ack featureId must be a string"))?
        .to_string();
    Ok(DeleteAck { feature_id })
}

pub fn decode_version_mismatch(raw: &Value) -> Result<VersionMismatch, WireError> {
    let body = raw
        .as_object()
        .ok_or(shape("version mismatch is not an object"))?;
    if body.get("type").and_then(Value::as_str) != Some("VERSION_MISMATCH") {
        return Err(shape("missing \"VERSION_MISMATCH\" tag"));
    }
    let feature_id = body
        .get("featureId")
        .and_then(Value::as_str)
        .ok_or(shape("version mismatch featureId must be a string"))?
        .to_string();
    let request_version = body
        .get("requestVersion")
        .and_then(Value::as_u64)
        .ok_or(shape("requestVersion must be a non-negative integer"))?;
    let current_version = body
        .get("currentVersion")
        .and_then(Value::as_u64)
        .ok_or(shape("currentVersion must be a non-negative integer"))?;
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .ok_or(shape("version mismatch message must be a string"))?
        .to_string();
    Ok(VersionMismatch {
        feature_id,
        request_version,
        current_version,
        message,
    })
}

pub fn decode_layer_list(raw: &Value) -> Result<Vec<Layer>, WireError> {
    let body = raw
        .as_object()
        .ok_or(shape("layer list is not an object"))?;
    body.get("layers")
        .and_then(Value::as_array)
        .ok_or(shape("layers must be an array"))?
        .iter()
        .map(|layer| serde_json::from_value(layer.clone()).map_err(|_| shape("malformed layer")))
        .collect()
}

// Boolean forms of the decoders, for callers that only branch on the
// payload shape.

pub fn is_feature(raw: &Value) -> bool {
    decode_feature(raw).is_ok()
}

pub fn is_feature_collection(raw: &Value) -> bool {
    decode_feature_collection(raw).is_ok()
}

pub fn is_delete_ack(raw: &Value) -> bool {
    decode_delete_ack(raw).is_ok()
}

pub fn is_version_mismatch(raw: &Value) -> bool {
    decode_version_mismatch(raw).is_ok()
}
