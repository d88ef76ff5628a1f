//! Observation assembly: the gated acquisition pipeline.
//!
//! A run goes permission → network → position. Nothing touches a radio or
//! the position source until permission resolves to granted in that run.
//! After that every query stands alone: each success lands in the session
//! as soon as it arrives, and each failure is recorded against its stage
//! without disturbing fields that already came back. Provider errors end
//! here; they become session state, never a returned error.

use log::{debug, warn};

use crate::model::{CollectionSession, NearbyNetwork, PermissionState, Stage};
use crate::permission::PermissionGate;
use crate::provider::{NetworkInfoProvider, PositionProvider, ProviderError};

/// Why a single stage could not be retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("{0:?} stage has not failed in this session")]
    NotRetryable(Stage),
}

/// Why the nearby-network listing failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NearbyError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Runs the acquisition pipeline against the device collaborators.
pub struct ObservationBuilder {
    gate: Box<dyn PermissionGate>,
    network: Box<dyn NetworkInfoProvider>,
    position: Box<dyn PositionProvider>,
}

impl ObservationBuilder {
    pub fn new(
        gate: Box<dyn PermissionGate>,
        network: Box<dyn NetworkInfoProvider>,
        position: Box<dyn PositionProvider>,
    ) -> Self {
        Self {
            gate,
            network,
            position,
        }
    }

    /// Runs every stage once, starting from an empty session.
    ///
    /// The returned session is terminal for this run: every applicable stage
    /// has either succeeded or recorded its failure.
    pub fn run(&mut self) -> CollectionSession {
        let mut session = CollectionSession::default();

        if !self.authorize(&mut session) {
            return session;
        }
        self.network_stage(&mut session);
        self.position_stage(&mut session);

        debug!(
            "run finished; missing {:?}",
            session.observation.missing_fields()
        );
        session
    }

    /// Re-runs one failed device stage within an existing session.
    ///
    /// Only the fields still absent are queried again; fields that already
    /// came back are never re-queried or cleared. Permission is re-checked
    /// on every retry: a revocation since the run started stops it, and a
    /// later re-grant lets the next retry through.
    pub fn retry(
        &mut self,
        session: &mut CollectionSession,
        stage: Stage,
    ) -> Result<(), RetryError> {
        let rerun: fn(&mut Self, &mut CollectionSession) = match stage {
            Stage::Network => Self::network_stage,
            Stage::Position => Self::position_stage,
            Stage::Permission => return Err(RetryError::NotRetryable(stage)),
        };
        if !session.is_failed(stage) {
            return Err(RetryError::NotRetryable(stage));
        }
        if !self.authorize(session) {
            return Err(RetryError::PermissionDenied);
        }
        rerun(self, session);
        Ok(())
    }

    /// Lists visible networks for the discovery view, behind the same gate.
    pub fn nearby(&mut self) -> Result<Vec<NearbyNetwork>, NearbyError> {
        if self.gate.request_access() != PermissionState::Granted {
            return Err(NearbyError::PermissionDenied);
        }
        Ok(self.network.list_nearby_networks()?)
    }

    /// Resolves permission into the session. Returns whether device stages
    /// may run.
    fn authorize(&mut self, session: &mut CollectionSession) -> bool {
        let state = self.gate.request_access();
        session.permission = state;
        if state == PermissionState::Granted {
            debug!("permission granted");
            session.resolve(Stage::Permission);
            true
        } else {
            warn!("location permission {state:?}; skipping device queries");
            session.fail(Stage::Permission, "location permission denied");
            false
        }
    }

    fn network_stage(&mut self, session: &mut CollectionSession) {
        let mut failure = None;

        if session.observation.network_id.is_none() {
            match self.network.current_network_identifier() {
                Ok(id) => {
                    debug!("network identifier: {id}");
                    session.observation.network_id = Some(id);
                }
                Err(e) => failure = Some(format!("network identifier {e}")),
            }
        }
        if session.observation.signal_level.is_none() {
            match self.network.current_signal_level() {
                Ok(level) => {
                    debug!("signal level: {level}");
                    session.observation.signal_level = Some(level);
                }
                Err(e) => failure = Some(format!("signal level {e}")),
            }
        }

        match failure {
            Some(message) => {
                warn!("network stage failed: {message}");
                session.fail(Stage::Network, message);
            }
            None => session.resolve(Stage::Network),
        }
    }

    fn position_stage(&mut self, session: &mut CollectionSession) {
        if session.observation.position.is_some() {
            session.resolve(Stage::Position);
            return;
        }
        match self.position.current_position() {
            Ok(position) => {
                debug!("position: {}, {}", position.lat, position.lon);
                session.observation.position = Some(position);
                session.resolve(Stage::Position);
            }
            Err(e) => {
                warn!("position stage failed: {e}");
                session.fail(Stage::Position, e.to_string());
            }
        }
    }
}
