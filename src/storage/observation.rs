//! Observation storage: insert records and read them all back.

use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{PersistedObservation, Position, Record};

use super::{ObservationStore, Result, Storage, StoreError};

impl ObservationStore for Storage {
    /// Inserts the record under a fresh v4 id.
    fn create(&mut self, record: &Record) -> Result<PersistedObservation> {
        let conn = self.open_db()?;
        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO observation (id, network_id, signal_level, lat, lon, captured_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                id.to_string(),
                &record.network_id,
                record.signal_level,
                record.position.lat,
                record.position.lon,
                record.captured_at.to_string(),
            ],
        )?;
        Ok(PersistedObservation {
            id,
            record: record.clone(),
        })
    }

    fn list_all(&self) -> Result<Vec<PersistedObservation>> {
        let conn = self.open_db()?;
        let mut stmt = conn.prepare(
            "SELECT id, network_id, signal_level, lat, lon, captured_at FROM observation",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i32>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut observations = Vec::new();
        for row in rows {
            let (id_str, network_id, signal_level, lat, lon, captured_at_str) = row?;
            let id = id_str
                .parse::<Uuid>()
                .map_err(|e| StoreError::Corrupt(format!("invalid observation id: {e}")))?;
            let captured_at = captured_at_str
                .parse::<Timestamp>()
                .map_err(|e| StoreError::Corrupt(format!("invalid captured_at: {e}")))?;
            observations.push(PersistedObservation {
                id,
                record: Record {
                    network_id,
                    signal_level,
                    position: Position { lat, lon },
                    captured_at,
                },
            });
        }
        Ok(observations)
    }
}
