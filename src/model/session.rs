//! Session types: the per-run scratch state of a collection.

use serde::{Deserialize, Serialize};

use super::observation::Observation;

/// Authorization to use location services.
///
/// Only ever moves out of `Unknown`; a terminal state is left only by an
/// external re-grant or reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionState {
    /// Not yet asked.
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// A stage of the collection pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Permission,
    Network,
    Position,
}

/// The failure recorded against a session: which stage, and what it said.
///
/// The most recent failing stage overwrites any earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageError {
    pub stage: Stage,
    pub message: String,
}

/// Working state for one run of the pipeline.
///
/// Created empty at the start of every run and never reused across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSession {
    pub observation: Observation,
    pub permission: PermissionState,
    pub error: Option<StageError>,

    /// Failures that have not since been cleared by a successful retry,
    /// oldest first.
    pub failed: Vec<StageError>,
}

impl CollectionSession {
    /// Records a failure for `stage`, replacing the error slot.
    pub fn fail(&mut self, stage: Stage, message: impl Into<String>) {
        let error = StageError {
            stage,
            message: message.into(),
        };
        self.failed.retain(|e| e.stage != stage);
        self.failed.push(error.clone());
        self.error = Some(error);
    }

    /// Clears `stage` from the failed set once it has fully succeeded.
    ///
    /// The error slot is only cleared when it names this stage; a failure
    /// from another stage stays visible.
    pub fn resolve(&mut self, stage: Stage) {
        self.failed.retain(|e| e.stage != stage);
        if self.error.as_ref().is_some_and(|e| e.stage == stage) {
            self.error = self.failed.last().cloned();
        }
    }

    /// Whether `stage` failed in this session and may be retried on its own.
    pub fn is_failed(&self, stage: Stage) -> bool {
        self.failed.iter().any(|e| e.stage == stage)
    }
}
