//! geoedit - client core for browsing map layers and editing a single
//! polygon feature against a version-checked feature server.
//!
//! Crate map:
//! - [`types`] - domain model, geometry, bbox, wire-contract guards
//! - [`client`] - `FeatureClient` trait + reqwest implementation
//! - [`session`] - the edit session state machine
//! - [`projection`] - render projections and the map surface seam
//!
//! Reads flow one way: client -> domain objects -> projection ->
//! renderer. Writes round-trip: draft mutation -> session engine ->
//! client -> server -> session update -> projection refresh.

pub use edit_session as session;
pub use geoedit_client as client;
pub use geoedit_types as types;
pub use map_projection as projection;

pub use edit_session::{DraftFeature, EditEngine, EditError, EditState};
pub use geoedit_client::{FeatureClient, HttpFeatureClient};
pub use geoedit_types::{Bbox, Feature, FeatureCollection, Layer};
