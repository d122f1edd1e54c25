//! Region records and the permission decision.

use super::Direction;
use crate::device::DeviceId;
use std::fmt;

/// Identifier of a live region: the index of its slot in the pool.
///
/// Stable while the region is allocated; reused only after the region is
/// destroyed.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
#[rkyv(derive(Debug))]
#[repr(transparent)]
pub struct RegionId(u32);

impl RegionId {
    /// Wrap a raw region id.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw region id.
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for RegionId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recorded grant of access from a region to a device.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize,
)]
#[rkyv(derive(Debug))]
pub struct Attachment {
    /// The attached device.
    pub device: DeviceId,
    /// Direction it was granted.
    pub direction: Direction,
}

/// Outcome of a permission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The device may be attached in the requested direction.
    Allowed,
    /// The request is refused.
    Denied(Denial),
}

impl Decision {
    /// True for [`Decision::Allowed`].
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// Why a permission check refused a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denial {
    /// Another device holds write access.
    WriterHeld(DeviceId),
    /// Read requested but nothing writes the region.
    NoWriter,
    /// The writer is not strictly upstream of the reader.
    NotDownstream,
    /// Writer and reader carry different media.
    StreamKindMismatch,
    /// A role or stream kind could not be decoded.
    MalformedId,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::WriterHeld(id) => write!(f, "writer {id} already holds the region"),
            Denial::NoWriter => write!(f, "region has no writer to read from"),
            Denial::NotDownstream => write!(f, "reader is not downstream of the writer"),
            Denial::StreamKindMismatch => write!(f, "stream kind differs from the writer"),
            Denial::MalformedId => write!(f, "malformed device identifier"),
        }
    }
}

/// A caller-described span of memory and the devices attached to it.
#[derive(Debug, Clone)]
pub struct Region {
    id: RegionId,
    base: u64,
    len: u32,
    writer: Option<DeviceId>,
    attachments: Box<[Option<Attachment>]>,
}

impl Region {
    pub(crate) fn new(id: RegionId, base: u64, len: u32, capacity: usize) -> Self {
        Self {
            id,
            base,
            len,
            writer: None,
            attachments: vec![None; capacity].into_boxed_slice(),
        }
    }

    /// Region identifier.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Base address.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Length in bytes.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// True if the region spans zero bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Device currently holding write access.
    pub fn writer(&self) -> Option<DeviceId> {
        self.writer
    }

    /// Current attachments, in entry order.
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().flatten()
    }

    /// Number of attached devices.
    pub fn attached_count(&self) -> usize {
        self.attachments().count()
    }

    /// Maximum number of simultaneous attachments.
    pub fn attachment_capacity(&self) -> usize {
        self.attachments.len()
    }

    /// Direction granted to `device`, if attached.
    pub fn direction_of(&self, device: DeviceId) -> Option<Direction> {
        self.attachments()
            .find(|a| a.device == device)
            .map(|a| a.direction)
    }

    /// Decide whether `device` may attach in `direction`. No mutation.
    ///
    /// A write needs the region to be unowned or already owned by `device`.
    /// A read needs a writer of the same stream kind whose role is strictly
    /// upstream of the reader. Read+write must pass both.
    pub fn check_permission(&self, device: DeviceId, direction: Direction) -> Decision {
        if direction.can_write() {
            match self.writer {
                Some(writer) if writer != device => {
                    return Decision::Denied(Denial::WriterHeld(writer));
                }
                _ => {}
            }
        }

        if direction.can_read() {
            let Some(writer) = self.writer else {
                return Decision::Denied(Denial::NoWriter);
            };
            let (Some(writer_role), Some(writer_kind), Some(role), Some(kind)) = (
                writer.role(),
                writer.stream_kind(),
                device.role(),
                device.stream_kind(),
            ) else {
                return Decision::Denied(Denial::MalformedId);
            };
            if writer_kind != kind {
                return Decision::Denied(Denial::StreamKindMismatch);
            }
            if !writer_role.is_upstream_of(role) {
                return Decision::Denied(Denial::NotDownstream);
            }
        }

        Decision::Allowed
    }

    /// Record `device` with `direction`.
    ///
    /// An existing entry for the device has its direction replaced.
    /// Returns `Some(true)` for a new entry, `Some(false)` for a replaced
    /// one, and `None` if the set is full (nothing changed).
    pub(crate) fn record(&mut self, device: DeviceId, direction: Direction) -> Option<bool> {
        let existing = self
            .attachments
            .iter()
            .position(|e| matches!(e, Some(a) if a.device == device));
        let (index, fresh) = match existing {
            Some(index) => (index, false),
            None => (self.attachments.iter().position(Option::is_none)?, true),
        };

        self.attachments[index] = Some(Attachment { device, direction });
        if direction.can_write() {
            self.writer = Some(device);
        } else if self.writer == Some(device) {
            self.writer = None;
        }
        Some(fresh)
    }

    /// Remove the entry for `device`. Returns false if it had none.
    pub(crate) fn remove(&mut self, device: DeviceId) -> bool {
        let Some(entry) = self
            .attachments
            .iter_mut()
            .find(|e| matches!(e, Some(a) if a.device == device))
        else {
            return false;
        };

        *entry = None;
        if self.writer == Some(device) {
            self.writer = None;
        }
        true
    }
}
