//! Edit session state model.
//!
//! `EditState` is a genuine sum type: no `Editing` field exists while
//! `Idle`, which keeps illegal combinations (a dirty flag with no
//! session) unrepresentable. Transitions replace the whole value.

use serde_json::{Map, Value};

use geoedit_types::{Feature, Geometry, VersionMismatch};

use crate::validate::{GeometryInvalid, ValidationCode};

/// The user's in-progress, unsaved copy of a feature's editable
/// fields. Always a deep, independent copy - a draft never aliases the
/// server-sourced feature it was cloned from.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftFeature {
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

impl DraftFeature {
    pub fn from_feature(feature: &Feature) -> Self {
        Self {
            properties: feature.properties.clone(),
            geometry: feature.geometry.clone(),
        }
    }
}

/// One feature under edit. `version` tracks the last version number
/// known to be authoritative on the server; it moves forward on every
/// successful save and on conflict re-fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub layer_id: String,
    pub feature_id: String,
    pub version: u64,
    pub draft: DraftFeature,
}

impl EditSession {
    pub fn open(layer_id: &str, feature: &Feature) -> Self {
        Self {
            layer_id: layer_id.to_string(),
            feature_id: feature.id.clone(),
            version: feature.version,
            draft: DraftFeature::from_feature(feature),
        }
    }
}

/// The most recent unresolved edit failure, kept on the session until
/// the next successful validation or save clears it.
#[derive(Debug, Clone, PartialEq)]
pub enum EditError {
    Validation(GeometryInvalid),
    Conflict(VersionMismatch),
}

impl EditError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, EditError::Conflict(_))
    }

    pub fn validation_code(&self) -> Option<ValidationCode> {
        match self {
            EditError::Validation(invalid) => Some(invalid.code),
            EditError::Conflict(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing {
        session: EditSession,
        /// True iff the draft differs from the last saved or loaded
        /// content.
        dirty: bool,
        last_error: Option<EditError>,
    },
}

impl EditState {
    pub fn is_editing(&self) -> bool {
        matches!(self, EditState::Editing { .. })
    }

    pub fn session(&self) -> Option<&EditSession> {
        match self {
            EditState::Editing { session, .. } => Some(session),
            EditState::Idle => None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self, EditState::Editing { dirty: true, .. })
    }

    pub fn last_error(&self) -> Option<&EditError> {
        match self {
            EditState::Editing { last_error, .. } => last_error.as_ref(),
            EditState::Idle => None,
        }
    }
}
