//! `FeatureClient` trait - the sole API boundary between the edit core
//! and the feature server. The engine depends on this trait, never on a
//! concrete transport.

pub mod http;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use geoedit_types::{Bbox, DeleteAck, Feature, FeatureCollection, Layer, WireError};

pub use http::HttpFeatureClient;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures crossing the client boundary. Cancellation is its own
/// outcome, never folded into `Http`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http {status}")]
    Http { status: u16, body: Value },

    #[error("request cancelled")]
    Cancelled,

    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    UnexpectedPayload(#[from] WireError),
}

impl ClientError {
    /// Status code for `Http` failures, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

/// Body of `PATCH /layers/{id}/features/{fid}`. At least one of
/// `properties` / `geometry` must be present; the server rejects an
/// empty patch.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatchFeatureRequest {
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<geoedit_types::Geometry>,
}

/// Body of `POST /layers/{id}/features`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateFeatureRequest {
    pub geometry: geoedit_types::Geometry,
    pub properties: Map<String, Value>,
}

pub const DEFAULT_LIMIT: u32 = 500;
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 5000;

/// Normalize a feature-count limit before it reaches the wire:
/// missing becomes the default, everything else is clamped to
/// `[MIN_LIMIT, MAX_LIMIT]`.
pub fn normalize_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(MIN_LIMIT, MAX_LIMIT)
}

#[async_trait]
pub trait FeatureClient: Send + Sync {
    async fn fetch_layers(&self, cancel: &CancellationToken) -> Result<Vec<Layer>>;

    /// Features intersecting `bbox`, at most `normalize_limit(limit)`
    /// of them.
    async fn fetch_features_in_bbox(
        &self,
        layer_id: &str,
        bbox: &Bbox,
        limit: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<FeatureCollection>;

    async fn fetch_feature_by_id(
        &self,
        layer_id: &str,
        feature_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Feature>;

    async fn create_feature(
        &self,
        layer_id: &str,
        request: CreateFeatureRequest,
        cancel: &CancellationToken,
    ) -> Result<Feature>;

    /// Carries the caller's believed-current version; the server
    /// answers 409 with a version-mismatch body when it is stale and
    /// 422 when the geometry fails validation.
    async fn patch_feature(
        &self,
        layer_id: &str,
        feature_id: &str,
        request: PatchFeatureRequest,
        cancel: &CancellationToken,
    ) -> Result<Feature>;

    async fn delete_feature(
        &self,
        layer_id: &str,
        feature_id: &str,
        version: u64,
        cancel: &CancellationToken,
    ) -> Result<DeleteAck>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn limit_defaults_when_absent() {
        assert_eq!(normalize_limit(None), 500);
    }

    #[test]
    fn limit_clamps_to_maximum() {
        assert_eq!(normalize_limit(Some(10_000)), 5000);
    }

    #[test]
    fn limit_clamps_to_minimum() {
        assert_eq!(normalize_limit(Some(0)), 1);
    }

    #[test]
    fn limit_passes_through_in_range() {
        assert_eq!(normalize_limit(Some(42)), 42);
    }

    #[test]
    fn patch_request_omits_absent_fields() {
        let request = PatchFeatureRequest {
            version: 3,
            properties: None,
            geometry: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, serde_json::json!({"version": 3}));
    }
}
