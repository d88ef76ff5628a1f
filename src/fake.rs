//! Scripted collaborators for tests.
//!
//! Every fake records its calls into a shared [`Calls`] log so tests can
//! assert both what ran and in which order.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{NearbyNetwork, PermissionState, PersistedObservation, Position, Record};
use crate::permission::PermissionGate;
use crate::provider::{self, NetworkInfoProvider, PositionProvider, ProviderError};
use crate::storage::{self, ObservationStore, StoreError};

pub fn fix() -> Position {
    Position {
        lat: 37.0,
        lon: -122.0,
    }
}

/// Ordered log of collaborator calls, shared between fakes.
#[derive(Debug, Clone, Default)]
pub struct Calls(Rc<RefCell<Vec<&'static str>>>);

impl Calls {
    fn record(&self, call: &'static str) {
        self.0.borrow_mut().push(call);
    }

    pub fn snapshot(&self) -> Vec<&'static str> {
        self.0.borrow().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.borrow().iter().filter(|c| **c == call).count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Replies in order; the last reply repeats forever.
#[derive(Debug, Clone)]
pub struct Script<T>(VecDeque<T>);

impl<T: Clone> Script<T> {
    pub fn new(replies: impl IntoIterator<Item = T>) -> Self {
        let replies: VecDeque<T> = replies.into_iter().collect();
        assert!(!replies.is_empty(), "script needs at least one reply");
        Self(replies)
    }

    fn reply(&mut self) -> T {
        if self.0.len() > 1 {
            self.0.pop_front().unwrap()
        } else {
            self.0[0].clone()
        }
    }
}

pub struct FakeGate {
    answer: Rc<Cell<PermissionState>>,
    calls: Calls,
}

impl FakeGate {
    pub fn new(answer: PermissionState, calls: &Calls) -> Self {
        Self {
            answer: Rc::new(Cell::new(answer)),
            calls: calls.clone(),
        }
    }

    /// Handle for changing the answer after the gate is handed off.
    pub fn answer_handle(&self) -> Rc<Cell<PermissionState>> {
        Rc::clone(&self.answer)
    }
}

impl PermissionGate for FakeGate {
    fn request_access(&mut self) -> PermissionState {
        self.calls.record("permission");
        self.answer.get()
    }
}

pub struct FakeNetwork {
    pub identifier: Script<provider::Result<String>>,
    pub level: Script<provider::Result<i32>>,
    pub calls: Calls,
}

impl FakeNetwork {
    pub fn connected(identifier: &str, level: i32, calls: &Calls) -> Self {
        Self {
            identifier: Script::new([Ok(identifier.to_string())]),
            level: Script::new([Ok(level)]),
            calls: calls.clone(),
        }
    }
}

impl NetworkInfoProvider for FakeNetwork {
    fn current_network_identifier(&mut self) -> provider::Result<String> {
        self.calls.record("network_id");
        self.identifier.reply()
    }

    fn current_signal_level(&mut self) -> provider::Result<i32> {
        self.calls.record("signal_level");
        self.level.reply()
    }

    fn list_nearby_networks(&mut self) -> provider::Result<Vec<NearbyNetwork>> {
        self.calls.record("nearby");
        let identifier = self.identifier.reply()?;
        let level = self.level.reply()?;
        Ok(vec![NearbyNetwork { identifier, level }])
    }
}

pub struct FakePosition {
    pub fix: Script<provider::Result<Position>>,
    pub calls: Calls,
}

impl FakePosition {
    pub fn fixed(position: Position, calls: &Calls) -> Self {
        Self::scripted([Ok(position)], calls)
    }

    pub fn failing(error: ProviderError, calls: &Calls) -> Self {
        Self::scripted([Err(error)], calls)
    }

    pub fn scripted(
        replies: impl IntoIterator<Item = provider::Result<Position>>,
        calls: &Calls,
    ) -> Self {
        Self {
            fix: Script::new(replies),
            calls: calls.clone(),
        }
    }
}

impl PositionProvider for FakePosition {
    fn current_position(&mut self) -> provider::Result<Position> {
        self.calls.record("position");
        self.fix.reply()
    }
}

/// In-memory store that can be told to fail.
pub struct FakeStore {
    records: Vec<PersistedObservation>,
    /// Errors returned by the next creates, one per call, before writes
    /// start succeeding.
    pub create_failures: VecDeque<StoreError>,
    pub list_error: Option<StoreError>,
    calls: Calls,
}

impl FakeStore {
    pub fn new(calls: &Calls) -> Self {
        Self {
            records: Vec::new(),
            create_failures: VecDeque::new(),
            list_error: None,
            calls: calls.clone(),
        }
    }

    pub fn with_record(mut self, network_id: &str, captured_at: Timestamp) -> Self {
        self.records.push(PersistedObservation {
            id: Uuid::new_v4(),
            record: Record {
                network_id: network_id.into(),
                signal_level: -70,
                position: fix(),
                captured_at,
            },
        });
        self
    }
}

impl ObservationStore for FakeStore {
    fn create(&mut self, record: &Record) -> storage::Result<PersistedObservation> {
        self.calls.record("create");
        if let Some(e) = self.create_failures.pop_front() {
            return Err(e);
        }
        let persisted = PersistedObservation {
            id: Uuid::new_v4(),
            record: record.clone(),
        };
        self.records.push(persisted.clone());
        Ok(persisted)
    }

    fn list_all(&self) -> storage::Result<Vec<PersistedObservation>> {
        self.calls.record("list_all");
        if let Some(e) = &self.list_error {
            return Err(e.clone());
        }
        // Newest first: callers must not rely on store order.
        Ok(self.records.iter().rev().cloned().collect())
    }
}
