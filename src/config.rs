//! Engine configuration and default constants.
//!
//! # Usage
//!
//! ```rust
//! use sdp::config::EngineConfig;
//! use sdp::device::{DeviceSpec, Role, StreamKind};
//!
//! let config = EngineConfig::default()
//!     .with_region_capacity(32)
//!     .with_device(DeviceSpec::new("aud", Role::Decoder, StreamKind::Audio));
//! assert!(config.validate().is_ok());
//! ```

use crate::device::{DeviceRegistry, DeviceSpec, Role, StreamKind};
use crate::error::{Error, Result};
use crate::observability::TracingConfig;

// =============================================================================
// Limits
// =============================================================================

/// Default number of region slots in the pool.
pub const DEFAULT_REGION_CAPACITY: usize = 20;

/// Default number of devices that may be attached to one region at once.
///
/// Chosen on its own, not derived from the catalog size.
pub const DEFAULT_ATTACHMENTS_PER_REGION: usize = 4;

/// Maximum length of a device name in bytes.
pub const MAX_NAME_LEN: usize = 64;

// =============================================================================
// Catalog
// =============================================================================

/// The reference platform catalog: a video decoder, a blitter and a display.
pub fn reference_catalog() -> Vec<DeviceSpec> {
    vec![
        DeviceSpec::new("delta", Role::Decoder, StreamKind::Video),
        DeviceSpec::new("bdisp", Role::Transformer, StreamKind::Video),
        DeviceSpec::new("sti", Role::Sink, StreamKind::Video),
    ]
}

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of region slots.
    pub region_capacity: usize,
    /// Attachment entries per region.
    pub attachments_per_region: usize,
    /// Device catalog.
    pub devices: Vec<DeviceSpec>,
    /// Span emission settings.
    pub tracing: TracingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            region_capacity: DEFAULT_REGION_CAPACITY,
            attachments_per_region: DEFAULT_ATTACHMENTS_PER_REGION,
            devices: reference_catalog(),
            tracing: TracingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Default limits with an empty catalog.
    pub fn empty() -> Self {
        Self {
            devices: Vec::new(),
            ..Self::default()
        }
    }

    /// Set the number of region slots.
    pub fn with_region_capacity(mut self, capacity: usize) -> Self {
        self.region_capacity = capacity;
        self
    }

    /// Set the number of attachment entries per region.
    pub fn with_attachments_per_region(mut self, capacity: usize) -> Self {
        self.attachments_per_region = capacity;
        self
    }

    /// Append a device to the catalog.
    pub fn with_device(mut self, device: DeviceSpec) -> Self {
        self.devices.push(device);
        self
    }

    /// Replace the catalog.
    pub fn with_devices(mut self, devices: impl IntoIterator<Item = DeviceSpec>) -> Self {
        self.devices = devices.into_iter().collect();
        self
    }

    /// Set span emission.
    pub fn with_tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }

    /// Check limits and catalog without building an engine.
    pub fn validate(&self) -> Result<()> {
        if self.region_capacity == 0 {
            return Err(Error::InvalidArgument("region_capacity must be > 0".into()));
        }
        if self.region_capacity > u32::MAX as usize {
            return Err(Error::InvalidArgument(
                "region_capacity does not fit a 32-bit region id".into(),
            ));
        }
        if self.attachments_per_region == 0 {
            return Err(Error::InvalidArgument(
                "attachments_per_region must be > 0".into(),
            ));
        }
        DeviceRegistry::new(self.devices.iter().cloned()).map(|_| ())
    }
}
