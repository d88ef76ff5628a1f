//! Observation types: what was read from the radios and the position fix.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A geographic fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

/// An observation under construction. Any field may still be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Identifier (SSID) of the active wireless network.
    pub network_id: Option<String>,

    /// Device-reported signal level. Carried as-is, never interpreted.
    pub signal_level: Option<i32>,

    /// Where the device was when the fix came back.
    pub position: Option<Position>,
}

impl Observation {
    /// Returns the complete form of this observation, or `None` while any
    /// field is still absent.
    pub fn submittable(&self) -> Option<Submittable> {
        Some(Submittable {
            network_id: self.network_id.clone()?,
            signal_level: self.signal_level?,
            position: self.position?,
        })
    }

    /// Wire names of the fields that are still absent, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.network_id.is_none() {
            missing.push("networkId");
        }
        if self.signal_level.is_none() {
            missing.push("signalLevel");
        }
        if self.position.is_none() {
            missing.push("position");
        }
        missing
    }
}

/// An observation with every field present, not yet stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct Submittable {
    network_id: String,
    signal_level: i32,
    position: Position,
}

impl Submittable {
    /// Stamps the observation at the moment of submission.
    pub fn stamp(self, captured_at: Timestamp) -> Record {
        Record {
            network_id: self.network_id,
            signal_level: self.signal_level,
            position: self.position,
            captured_at,
        }
    }
}

/// The record handed to the store: complete and timestamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub network_id: String,
    pub signal_level: i32,
    pub position: Position,

    /// When the record was submitted, not when collection began.
    pub captured_at: Timestamp,
}

/// A record the store has accepted, with its store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedObservation {
    pub id: Uuid,

    #[serde(flatten)]
    pub record: Record,
}

/// A network seen by a scan, for the discovery view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyNetwork {
    pub identifier: String,
    pub level: i32,
}
