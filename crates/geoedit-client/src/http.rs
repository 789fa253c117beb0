//! HTTP implementation of `FeatureClient` over reqwest.
//!
//! Non-2xx responses become `ClientError::Http` carrying the decoded
//! JSON body so callers can interpret 409/422 payloads. Every request
//! races the caller's cancellation token.

use anyhow::anyhow;
use reqwest::Method;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use async_trait::async_trait;
use geoedit_types::{wire, Bbox, DeleteAck, Feature, FeatureCollection, Layer};

use crate::{
    normalize_limit, ClientError, CreateFeatureRequest, FeatureClient, PatchFeatureRequest, Result,
};

#[derive(Debug, Clone)]
pub struct HttpFeatureClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpFeatureClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            auth_token: None,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Create from `GEOEDIT_API_BASE_URL` (+ optional
    /// `GEOEDIT_API_TOKEN`).
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = std::env::var("GEOEDIT_API_BASE_URL")
            .map_err(|_| anyhow!("GEOEDIT_API_BASE_URL environment variable not set"))?;
        let client = Self::new(base_url);
        Ok(match std::env::var("GEOEDIT_API_TOKEN") {
            Ok(token) => client.with_token(token),
            Err(_) => client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.endpoint(path));
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let roundtrip = async {
            let response = builder.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.json::<Value>().await.unwrap_or(Value::Null);
                tracing::warn!(status = status.as_u16(), "feature server rejected request");
                return Err(ClientError::Http {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(response.json::<Value>().await?)
        };
        tokio::select! {
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            outcome = roundtrip => outcome,
        }
    }
}

#[async_trait]
impl FeatureClient for HttpFeatureClient {
    async fn fetch_layers(&self, cancel: &CancellationToken) -> Result<Vec<Layer>> {
        tracing::debug!("fetching layer list");
        let body = self
            .send(self.request(Method::GET, "/api/v1/layers"), cancel)
            .await?;
        Ok(wire::decode_layer_list(&body)?)
    }

    async fn fetch_features_in_bbox(
        &self,
        layer_id: &str,
        bbox: &Bbox,
        limit: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<FeatureCollection> {
        let limit = normalize_limit(limit);
        tracing::debug!(layer_id, limit, bbox = %bbox.to_query(), "fetching viewport features");
        let builder = self
            .request(Method::GET, &format!("/api/v1/layers/{layer_id}/features"))
            .query(&[("bbox", bbox.to_query()), ("limit", limit.to_string())]);
        let body = self.send(builder, cancel).await?;
        Ok(wire::decode_feature_collection(&body)?)
    }

    async fn fetch_feature_by_id(
        &self,
        layer_id: &str,
        feature_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Feature> {
        tracing::debug!(layer_id, feature_id, "fetching feature");
        let builder = self.request(
            Method::GET,
            &format!("/api/v1/layers/{layer_id}/features/{feature_id}"),
        );
        let body = self.send(builder, cancel).await?;
        Ok(wire::decode_feature(&body)?)
    }

    async fn create_feature(
        &self,
        layer_id: &str,
        request: CreateFeatureRequest,
        cancel: &CancellationToken,
    ) -> Result<Feature> {
        tracing::debug!(layer_id, "creating feature");
        let builder = self
            .request(Method::POST, &format!("/api/v1/layers/{layer_id}/features"))
            .json(&request);
        let body = self.send(builder, cancel).await?;
        Ok(wire::decode_feature(&body)?)
    }

    async fn patch_feature(
        &self,
        layer_id: &str,
        feature_id: &str,
        request: PatchFeatureRequest,
        cancel: &CancellationToken,
    ) -> Result<Feature> {
        tracing::debug!(
            layer_id,
            feature_id,
            version = request.version,
            "patching feature"
        );
        let builder = self
            .request(
                Method::PATCH,
                &format!("/api/v1/layers/{layer_id}/features/{feature_id}"),
            )
            .json(&request);
        let body = self.send(builder, cancel).await?;
        Ok(wire::decode_patch_response(&body)?)
    }

    async fn delete_feature(
        &self,
        layer_id: &str,
        feature_id: &str,
        version: u64,
        cancel: &CancellationToken,
    ) -> Result<DeleteAck> {
        tracing::debug!(layer_id, feature_id, version, "deleting feature");
        let builder = self
            .request(
                Method::DELETE,
                &format!("/api/v1/layers/{layer_id}/features/{feature_id}"),
            )
            .json(&serde_json::json!({ "version": version }));
        let body = self.send(builder, cancel).await?;
        Ok(wire::decode_delete_ack(&body)?)
    }
}
