//! Structured status snapshots.
//!
//! A [`StatusReport`] is plain data: the catalog with live reference counts
//! and every allocated region with its writer and attachments. It carries no
//! text layout; [`StatusTranscript`](crate::command::StatusTranscript)
//! renders it for humans, and the rkyv derives let a boundary ship it to
//! another process as is.

use crate::device::{Device, DeviceId, DeviceRegistry, Role, StreamKind};
use crate::region::{Attachment, Region, RegionId, RegionTable};

/// State of one catalog device.
#[derive(Debug, Clone, PartialEq, Eq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
#[rkyv(derive(Debug))]
pub struct DeviceStatus {
    /// Device name.
    pub name: String,
    /// Typed identifier.
    pub id: DeviceId,
    /// Number of regions the device is attached to.
    pub refcount: u32,
}

impl DeviceStatus {
    fn capture(device: &Device) -> Self {
        Self {
            name: device.name().to_string(),
            id: device.id(),
            refcount: device.refcount(),
        }
    }

    /// Pipeline role.
    pub fn role(&self) -> Option<Role> {
        self.id.role()
    }

    /// Stream kind.
    pub fn stream_kind(&self) -> Option<StreamKind> {
        self.id.stream_kind()
    }
}

/// State of one live region.
#[derive(Debug, Clone, PartialEq, Eq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
#[rkyv(derive(Debug))]
pub struct RegionStatus {
    /// Region identifier.
    pub id: RegionId,
    /// Base address.
    pub base: u64,
    /// Length in bytes.
    pub len: u32,
    /// Device holding write access.
    pub writer: Option<DeviceId>,
    /// Attachments in entry order.
    pub attachments: Vec<Attachment>,
}

impl RegionStatus {
    /// Snapshot a region.
    pub fn capture(region: &Region) -> Self {
        Self {
            id: region.id(),
            base: region.base(),
            len: region.len(),
            writer: region.writer(),
            attachments: region.attachments().copied().collect(),
        }
    }
}

/// Snapshot of the whole engine.
#[derive(Debug, Clone, PartialEq, Eq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
#[rkyv(derive(Debug))]
pub struct StatusReport {
    /// Catalog, in declaration order.
    pub devices: Vec<DeviceStatus>,
    /// Live regions, in id order.
    pub regions: Vec<RegionStatus>,
}

impl StatusReport {
    /// Snapshot a registry and a region table.
    pub fn capture(devices: &DeviceRegistry, regions: &RegionTable) -> Self {
        Self {
            devices: devices.iter().map(DeviceStatus::capture).collect(),
            regions: regions.iter().map(RegionStatus::capture).collect(),
        }
    }

    /// Status of a device by name.
    pub fn device(&self, name: &str) -> Option<&DeviceStatus> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Status of a live region.
    pub fn region(&self, id: RegionId) -> Option<&RegionStatus> {
        self.regions.iter().find(|r| r.id == id)
    }
}
