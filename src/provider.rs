//! Device collaborators: the radios and the position fix.
//!
//! The pipeline depends only on these traits. Each method is one device
//! query that either answers or fails on its own; a failure never says
//! anything about sibling queries.

pub mod fixed;
pub mod nmcli;

use crate::model::{NearbyNetwork, Position};

/// Errors a single device query can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("location permission revoked")]
    PermissionRevoked,
}

pub type Result<T> = core::result::Result<T, ProviderError>;

/// Queries about the active wireless connection.
pub trait NetworkInfoProvider {
    /// Identifier of the network currently connected to.
    fn current_network_identifier(&mut self) -> Result<String>;

    /// Signal level of the current connection, as the device reports it.
    fn current_signal_level(&mut self) -> Result<i32>;

    /// Networks visible from here. Not part of the submission path.
    fn list_nearby_networks(&mut self) -> Result<Vec<NearbyNetwork>>;
}

/// Queries about where the device is.
pub trait PositionProvider {
    fn current_position(&mut self) -> Result<Position>;
}
