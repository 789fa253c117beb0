//! Edit session engine.
//!
//! Drives the validate -> submit -> conflict-recovery cycle for one
//! draft:
//!
//! ```text
//! Idle ──start_editing──▶ Editing ──cancel_editing──▶ Idle
//!                           │ update_draft      (local validation)
//!                           │ save_editing ───▶ PATCH ── 409 ──▶ re-fetch ──▶ restart
//!                           │ delete_editing ─▶ DELETE            └─ 404 ──▶ Idle
//! ```
//!
//! The engine holds the only mutable state in the core and replaces it
//! wholesale on every transition. It does not serialize overlapping
//! saves; callers disable the triggering control while a save or
//! delete is in flight. A cancelled operation leaves the state exactly
//! as it was - abandoned, not failed.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use geoedit_client::{ClientError, FeatureClient, PatchFeatureRequest};
use geoedit_types::{wire, Feature};

use crate::state::{DraftFeature, EditError, EditSession, EditState};
use crate::validate::{validate_polygon, GeometryInvalid, ValidationCode};

/// Failures the engine cannot absorb into the session: transport
/// errors, malformed payloads, unexpected status codes. Recoverable
/// rejections (422, well-formed 409) land in
/// `EditState::Editing::last_error` instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type EngineResult<T> = Result<T, EngineError>;

pub struct EditEngine {
    client: Arc<dyn FeatureClient>,
    state: EditState,
}

impl EditEngine {
    /// Dependencies are injected here; the engine never reaches for
    /// ambient globals.
    pub fn new(client: Arc<dyn FeatureClient>) -> Self {
        Self {
            client,
            state: EditState::Idle,
        }
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// Open a feature for editing: a fresh deep-copied draft, the
    /// feature's version as the session's version token, clean slate.
    pub fn start_editing(&mut self, layer_id: &str, feature: &Feature) {
        self.state = EditState::Editing {
            session: EditSession::open(layer_id, feature),
            dirty: false,
            last_error: None,
        };
    }

    /// Replace the draft after local validation. An invalid draft is
    /// rejected in full: the previous draft stays, the failure is
    /// recorded, and the dirty flag is untouched.
    pub fn update_draft(&mut self, draft: DraftFeature) {
        let EditState::Editing { session, dirty, .. } = &self.state else {
            return;
        };
        match validate_polygon(&draft.geometry) {
            Ok(()) => {
                self.state = EditState::Editing {
                    session: EditSession {
                        draft,
                        ..session.clone()
                    },
                    dirty: true,
                    last_error: None,
                };
            }
            Err(invalid) => {
                self.state = EditState::Editing {
                    session: session.clone(),
                    dirty: *dirty,
                    last_error: Some(EditError::Validation(invalid)),
                };
            }
        }
    }

    /// Discard the session and any unsaved edits.
    pub fn cancel_editing(&mut self) {
        self.state = EditState::Idle;
    }

    /// Submit the draft with the session's version token. A clean
    /// session issues no request. On success the server's echoed
    /// content replaces the draft - the server is authoritative and
    /// may have normalized the geometry.
    pub async fn save_editing(&mut self, cancel: &CancellationToken) -> EngineResult<()> {
        let EditState::Editing {
            session,
            dirty: true,
            ..
        } = &self.state
        else {
            return Ok(());
        };
        let session = session.clone();
        let request = PatchFeatureRequest {
            version: session.version,
            properties: Some(session.draft.properties.clone()),
            geometry: Some(session.draft.geometry.clone()),
        };
        let client = Arc::clone(&self.client);
        match client
            .patch_feature(&session.layer_id, &session.feature_id, request, cancel)
            .await
        {
            Ok(feature) => {
                self.state = EditState::Editing {
                    session: EditSession {
                        version: feature.version,
                        draft: DraftFeature::from_feature(&feature),
                        ..session
                    },
                    dirty: false,
                    last_error: None,
                };
                Ok(())
            }
            Err(ClientError::Cancelled) => Ok(()),
            Err(ClientError::Http { status, body }) => {
                self.recover_from_status(status, body, cancel).await
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Delete the feature under edit. Returns `true` when the feature
    /// is gone from the server - either this delete succeeded, or
    /// conflict recovery discovered it was already deleted upstream.
    pub async fn delete_editing(&mut self, cancel: &CancellationToken) -> EngineResult<bool> {
        let EditState::Editing { session, .. } = &self.state else {
            return Ok(false);
        };
        let session = session.clone();
        let client = Arc::clone(&self.client);
        match client
            .delete_feature(
                &session.layer_id,
                &session.feature_id,
                session.version,
                cancel,
            )
            .await
        {
            Ok(_ack) => {
                self.state = EditState::Idle;
                Ok(true)
            }
            Err(ClientError::Cancelled) => Ok(false),
            Err(ClientError::Http { status, body }) => {
                self.recover_from_status(status, body, cancel).await?;
                Ok(!self.state.is_editing())
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Interpret a rejection from the feature server. 422 and a
    /// well-formed 409 are absorbed into the session; everything else
    /// propagates with the session untouched.
    async fn recover_from_status(
        &mut self,
        status: u16,
        body: Value,
        cancel: &CancellationToken,
    ) -> EngineResult<()> {
        match status {
            422 => {
                self.set_last_error(EditError::Validation(GeometryInvalid::new(
                    ValidationCode::InvalidCoordinates,
                    rejection_message(&body),
                )));
                Ok(())
            }
            409 => {
                let mismatch = wire::decode_version_mismatch(&body).map_err(ClientError::from)?;
                self.set_last_error(EditError::Conflict(mismatch));
                self.resync_after_conflict(cancel).await
            }
            _ => Err(ClientError::Http { status, body }.into()),
        }
    }

    /// Re-fetch the authoritative feature and restart the session from
    /// it. The stale draft is discarded; the conflict error stays
    /// surfaced until the next update or save outcome overwrites it.
    /// A 404 means the feature was deleted upstream - the session is
    /// over.
    async fn resync_after_conflict(&mut self, cancel: &CancellationToken) -> EngineResult<()> {
        let EditState::Editing {
            session,
            last_error,
            ..
        } = &self.state
        else {
            return Ok(());
        };
        let layer_id = session.layer_id.clone();
        let feature_id = session.feature_id.clone();
        let conflict = last_error.clone();
        let client = Arc::clone(&self.client);
        match client
            .fetch_feature_by_id(&layer_id, &feature_id, cancel)
            .await
        {
            Ok(feature) => {
                self.state = EditState::Editing {
                    session: EditSession::open(&layer_id, &feature),
                    dirty: false,
                    last_error: conflict,
                };
                Ok(())
            }
            Err(ClientError::Cancelled) => Ok(()),
            Err(ClientError::Http { status: 404, .. }) => {
                self.state = EditState::Idle;
                Ok(())
            }
            Err(other) => Err(other.into()),
        }
    }

    fn set_last_error(&mut self, error: EditError) {
        if let EditState::Editing { session, dirty, .. } = &self.state {
            self.state = EditState::Editing {
                session: session.clone(),
                dirty: *dirty,
                last_error: Some(error),
            };
        }
    }
}

fn rejection_message(body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .unwrap_or("ValidationError(422)")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use geoedit_client::{CreateFeatureRequest, Result as ClientResult};
    use geoedit_types::{Bbox, DeleteAck, FeatureCollection, Geometry, Layer};
    use pretty_assertions::assert_eq;

    /// Client for transitions that must never reach the network.
    struct NoNetworkClient;

    #[async_trait]
    impl FeatureClient for NoNetworkClient {
        async fn fetch_layers(&self, _cancel: &CancellationToken) -> ClientResult<Vec<Layer>> {
            panic!("unexpected network call");
        }
        async fn fetch_features_in_bbox(
            &self,
            _layer_id: &str,
            _bbox: &Bbox,
            _limit: Option<u32>,
            _cancel: &CancellationToken,
        ) -> ClientResult<FeatureCollection> {
            panic!("unexpected network call");
        }
        async fn fetch_feature_by_id(
            &self,
            _layer_id: &str,
            _feature_id: &str,
            _cancel: &CancellationToken,
        ) -> ClientResult<Feature> {
            panic!("unexpected network call");
        }
        async fn create_feature(
            &self,
            _layer_id: &str,
            _request: CreateFeatureRequest,
            _cancel: &CancellationToken,
        ) -> ClientResult<Feature> {
            panic!("unexpected network call");
        }
        async fn patch_feature(
            &self,
            _layer_id: &str,
            _feature_id: &str,
            _request: PatchFeatureRequest,
            _cancel: &CancellationToken,
        ) -> ClientResult<Feature> {
            panic!("unexpected network call");
        }
        async fn delete_feature(
            &self,
            _layer_id: &str,
            _feature_id: &str,
            _version: u64,
            _cancel: &CancellationToken,
        ) -> ClientResult<DeleteAck> {
            panic!("unexpected network call");
        }
    }

    fn engine() -> EditEngine {
        EditEngine::new(Arc::new(NoNetworkClient))
    }

    fn square() -> Geometry {
        Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 0.0],
        ]])
    }

    fn feature() -> Feature {
        Feature {
            id: "f1".into(),
            version: 3,
            geometry: square(),
            properties: serde_json::Map::new(),
        }
    }

    #[test]
    fn start_then_cancel_restores_idle_exactly() {
        let mut engine = engine();
        let before = engine.state().clone();
        engine.start_editing("l1", &feature());
        assert!(engine.state().is_editing());
        engine.cancel_editing();
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn valid_update_marks_dirty_and_clears_error() {
        let mut engine = engine();
        engine.start_editing("l1", &feature());

        // first poison the error slot with an invalid draft
        engine.update_draft(DraftFeature {
            properties: serde_json::Map::new(),
            geometry: Geometry::point([0.0, 0.0]),
        });
        assert!(engine.state().last_error().is_some());

        let moved = Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 2.0],
            [0.0, 0.0],
        ]]);
        engine.update_draft(DraftFeature {
            properties: serde_json::Map::new(),
            geometry: moved.clone(),
        });

        assert!(engine.state().is_dirty());
        assert!(engine.state().last_error().is_none());
        assert_eq!(engine.state().session().unwrap().draft.geometry, moved);
    }

    #[test]
    fn open_ring_update_keeps_previous_draft_and_dirty_flag() {
        let mut engine = engine();
        let feature = feature();
        engine.start_editing("l1", &feature);

        let open_ring = Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.5, 0.5],
        ]]);
        engine.update_draft(DraftFeature {
            properties: serde_json::Map::new(),
            geometry: open_ring,
        });

        let state = engine.state();
        assert!(state.is_editing());
        assert!(!state.is_dirty(), "dirty flag must survive the rejection");
        assert_eq!(
            state.last_error().and_then(EditError::validation_code),
            Some(ValidationCode::RingNotClosed)
        );
        assert_eq!(
            state.session().unwrap().draft.geometry,
            feature.geometry,
            "rejected draft must not replace the previous one"
        );
    }

    #[test]
    fn update_draft_is_a_noop_while_idle() {
        let mut engine = engine();
        engine.update_draft(DraftFeature {
            properties: serde_json::Map::new(),
            geometry: square(),
        });
        assert_eq!(engine.state(), &EditState::Idle);
    }

    #[tokio::test]
    async fn clean_session_save_issues_no_request() {
        // NoNetworkClient panics on any call - a clean save must not reach it
        let mut engine = engine();
        engine.start_editing("l1", &feature());
        engine
            .save_editing(&CancellationToken::new())
            .await
            .unwrap();
        assert!(engine.state().is_editing());
        assert!(!engine.state().is_dirty());
    }

    #[tokio::test]
    async fn save_while_idle_is_a_noop() {
        let mut engine = engine();
        engine
            .save_editing(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(engine.state(), &EditState::Idle);
    }

    #[tokio::test]
    async fn delete_while_idle_reports_nothing_deleted() {
        let mut engine = engine();
        let deleted = engine
            .delete_editing(&CancellationToken::new())
            .await
            .unwrap();
        assert!(!deleted);
    }
}
