//! Collection controller: owns the current session and the cached history.
//!
//! Both are replaced wholesale: a run swaps in a finished session, a refresh
//! swaps in a freshly listed history. Nothing outside the builder and the
//! store mutates them field by field.

use jiff::Timestamp;
use log::{info, warn};

use crate::builder::{NearbyError, ObservationBuilder, RetryError};
use crate::model::{CollectionSession, NearbyNetwork, PersistedObservation, Stage};
use crate::storage::{ObservationStore, StoreError};

/// Why a save did not go through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    /// Nothing was written: the observation is still missing fields.
    #[error("observation is incomplete; missing {}", missing.join(", "))]
    IncompleteObservation { missing: Vec<&'static str> },

    /// The store refused or could not be reached. The session is kept.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Ties the pipeline to the store for the presentation layer.
pub struct CollectionController {
    builder: ObservationBuilder,
    store: Box<dyn ObservationStore>,
    session: Option<CollectionSession>,
    history: Vec<PersistedObservation>,
}

impl CollectionController {
    pub fn new(builder: ObservationBuilder, store: Box<dyn ObservationStore>) -> Self {
        Self {
            builder,
            store,
            session: None,
            history: Vec::new(),
        }
    }

    /// The session of the latest run, if one is in hand.
    ///
    /// `None` before the first run and after a successful save.
    pub fn session(&self) -> Option<&CollectionSession> {
        self.session.as_ref()
    }

    /// Persisted records as of the last successful refresh, in store order.
    pub fn history(&self) -> &[PersistedObservation] {
        &self.history
    }

    /// Runs a fresh collection, then refreshes the history.
    ///
    /// Any session from an earlier run is dropped before this one starts. A
    /// refresh failure is logged; the history keeps its previous contents.
    pub fn start(&mut self) -> &CollectionSession {
        self.session = None;
        let session = self.builder.run();

        if let Err(e) = self.refresh() {
            warn!("initial refresh failed: {e}");
        }
        self.session.insert(session)
    }

    /// Retries one failed device stage of the current session.
    pub fn retry(&mut self, stage: Stage) -> Result<&CollectionSession, RetryError> {
        let session = self
            .session
            .as_mut()
            .ok_or(RetryError::NotRetryable(stage))?;
        self.builder.retry(session, stage)?;
        Ok(&*session)
    }

    /// Stamps and persists the current observation, then refreshes.
    ///
    /// Nothing reaches the store unless every field is present. A store
    /// failure leaves the session in place so the save can be retried
    /// without collecting again.
    pub fn save(&mut self) -> Result<PersistedObservation, SaveError> {
        let observation = self
            .session
            .as_ref()
            .map(|s| s.observation.clone())
            .unwrap_or_default();
        let Some(submittable) = observation.submittable() else {
            return Err(SaveError::IncompleteObservation {
                missing: observation.missing_fields(),
            });
        };

        let record = submittable.stamp(Timestamp::now());
        let persisted = self.store.create(&record)?;
        info!(
            "saved observation {} ({} at {})",
            persisted.id, persisted.record.network_id, persisted.record.captured_at
        );
        self.session = None;

        if let Err(e) = self.refresh() {
            warn!("refresh after save failed: {e}");
        }
        Ok(persisted)
    }

    /// Replaces the cached history with the store's current contents.
    pub fn refresh(&mut self) -> Result<&[PersistedObservation], StoreError> {
        self.history = self.store.list_all()?;
        info!("history refreshed: {} record(s)", self.history.len());
        Ok(&self.history)
    }

    /// Networks visible from here, for the discovery view.
    pub fn nearby(&mut self) -> Result<Vec<NearbyNetwork>, NearbyError> {
        self.builder.nearby()
    }
}
