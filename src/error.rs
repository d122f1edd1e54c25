//! Error types for the secure data path engine.

use crate::device::DeviceId;
use crate::region::{Direction, RegionId};
use thiserror::Error;

/// Result type alias using the engine's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for region and device operations.
///
/// Every variant is recoverable: a failed operation leaves the engine
/// state exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No device with this name exists in the catalog.
    #[error("device not found: {0:?}")]
    DeviceNotFound(String),

    /// No catalog device carries this identifier.
    #[error("no device with identifier {0}")]
    UnknownDeviceId(DeviceId),

    /// The region id is out of range or its slot is free.
    #[error("region {0} not found")]
    RegionNotFound(RegionId),

    /// Region pool is exhausted (no free slots).
    #[error("region pool exhausted: all {capacity} slots in use")]
    Exhausted {
        /// Capacity of the pool.
        capacity: usize,
    },

    /// The region's attachment set has no free entry.
    #[error("region {region} attachment set full ({capacity} entries)")]
    Full {
        /// Region that was targeted.
        region: RegionId,
        /// Attachment capacity of the region.
        capacity: usize,
    },

    /// Detach requested for a device with no entry in the region.
    #[error("device {device:?} is not attached to region {region}")]
    NotAttached {
        /// Region that was targeted.
        region: RegionId,
        /// Name of the device.
        device: String,
    },

    /// The permission check refused the request.
    #[error("device {device:?} denied {direction} access to region {region}")]
    Denied {
        /// Region that was targeted.
        region: RegionId,
        /// Name of the requesting device.
        device: String,
        /// Requested access direction.
        direction: Direction,
    },

    /// Malformed argument (direction code, command code, configuration).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A thread panicked while holding the engine lock.
    #[error("engine state poisoned by a panicked caller")]
    Poisoned,
}

impl Error {
    /// Returns true for the lookup failures (unknown region or device).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::DeviceNotFound(_) | Error::UnknownDeviceId(_) | Error::RegionNotFound(_)
        )
    }
}
