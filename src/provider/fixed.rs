//! Configured position source: serves the fix written in `config.toml`.
//!
//! Hosts without a GNSS receiver still need a position. The fix only counts
//! while location permission is recorded as granted.

use std::path::PathBuf;

use crate::model::{PermissionState, Position};
use crate::permission;

use super::{PositionProvider, ProviderError, Result};

/// Position provider returning a fixed, configured coordinate.
#[derive(Debug, Clone)]
pub struct FixedPosition {
    position: Option<Position>,
    consent: PathBuf,
}

impl FixedPosition {
    /// `consent` is the permission record checked before every fix.
    pub fn new(position: Option<Position>, consent: impl Into<PathBuf>) -> Self {
        Self {
            position,
            consent: consent.into(),
        }
    }
}

impl PositionProvider for FixedPosition {
    fn current_position(&mut self) -> Result<Position> {
        match permission::read_state(&self.consent) {
            Ok(PermissionState::Granted) => {}
            Ok(PermissionState::Denied) => return Err(ProviderError::PermissionRevoked),
            Ok(PermissionState::Unknown) => {
                return Err(ProviderError::Unavailable(
                    "location permission not recorded".into(),
                ));
            }
            Err(e) => return Err(ProviderError::Unavailable(e.to_string())),
        }
        self.position.ok_or_else(|| {
            ProviderError::Unavailable("no position configured; set [position] in config".into())
        })
    }
}
