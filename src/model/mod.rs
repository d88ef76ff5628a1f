//! Core data model for sitelog.
//!
//! An observation is assembled field by field inside a collection session,
//! stamped into a record when it is complete, and persisted by the store.

mod observation;
mod session;

pub use observation::{
    NearbyNetwork, Observation, PersistedObservation, Position, Record, Submittable,
};
pub use session::{CollectionSession, PermissionState, Stage, StageError};
