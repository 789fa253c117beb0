//! Draft edit session for a single polygon feature.
//!
//! The crate owns the client-side half of the optimistic-concurrency
//! protocol: a draft copy of one feature, local structural validation
//! before anything touches the network, version-stamped patch/delete
//! submission, and forced resynchronization when the server reports a
//! version conflict.

mod engine;
mod state;
mod validate;

pub use engine::{EditEngine, EngineError, EngineResult};
pub use state::{DraftFeature, EditError, EditSession, EditState};
pub use validate::{validate_polygon, GeometryInvalid, ValidationCode};
