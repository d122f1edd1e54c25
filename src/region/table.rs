//! Fixed-capacity region table.

use super::{Decision, Direction, Region, RegionId};
use crate::device::{Device, DeviceRegistry};
use crate::error::{Error, Result};

/// A slot in the region pool.
#[derive(Debug, Clone)]
enum Slot {
    Free,
    Occupied(Region),
}

/// Pool of region records.
///
/// # Design
///
/// - Fixed capacity: the slot array never grows
/// - Lowest-index allocation: a destroyed region's id is the first reused
/// - Explicit tags: a region based at address 0 is a live region like any other
/// - Policy-free mutation: [`attach`](Self::attach) trusts the caller to have
///   run [`check_permission`](Self::check_permission) under the same lock
///
/// The table does not own the device catalog. Operations that move a
/// reference count take the [`Device`] (or the [`DeviceRegistry`]) they
/// apply to.
#[derive(Debug)]
pub struct RegionTable {
    slots: Box<[Slot]>,
    attachments_per_region: usize,
}

impl RegionTable {
    /// Create a table with `capacity` free slots, each region holding up to
    /// `attachments_per_region` attachments.
    pub fn new(capacity: usize, attachments_per_region: usize) -> Self {
        Self {
            slots: vec![Slot::Free; capacity].into_boxed_slice(),
            attachments_per_region,
        }
    }

    /// Free every slot and zero every reference count in `devices`.
    ///
    /// Idempotent.
    pub fn init(&mut self, devices: &DeviceRegistry) {
        self.slots.fill(Slot::Free);
        devices.reset();
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Attachment entries per region.
    pub fn attachments_per_region(&self) -> usize {
        self.attachments_per_region
    }

    /// Number of live regions.
    pub fn live_count(&self) -> usize {
        self.iter().count()
    }

    /// Iterate over live regions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(region) => Some(region),
            Slot::Free => None,
        })
    }

    /// Allocate the lowest free slot for a region at `base` spanning `len` bytes.
    pub fn create(&mut self, base: u64, len: u32) -> Result<RegionId> {
        let index = self
            .slots
            .iter()
            .position(|slot| matches!(slot, Slot::Free))
            .ok_or(Error::Exhausted {
                capacity: self.slots.len(),
            })?;

        let id = RegionId::new(index as u32);
        self.slots[index] = Slot::Occupied(Region::new(id, base, len, self.attachments_per_region));
        Ok(id)
    }

    /// Release every attachment of the region, then free its slot.
    pub fn destroy(&mut self, id: RegionId, devices: &DeviceRegistry) -> Result<()> {
        let region = self.find(id)?;
        let attached = region
            .attachments()
            .map(|a| devices.lookup_by_id(a.device))
            .collect::<Result<Vec<_>>>()?;

        for device in attached {
            device.decrement();
        }
        self.slots[id.index()] = Slot::Free;
        Ok(())
    }

    /// Look up a live region.
    pub fn find(&self, id: RegionId) -> Result<&Region> {
        match self.slots.get(id.index()) {
            Some(Slot::Occupied(region)) => Ok(region),
            _ => Err(Error::RegionNotFound(id)),
        }
    }

    fn find_mut(&mut self, id: RegionId) -> Result<&mut Region> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Occupied(region)) => Ok(region),
            _ => Err(Error::RegionNotFound(id)),
        }
    }

    /// Decide whether `device` may attach to region `id` in `direction`.
    pub fn check_permission(
        &self,
        id: RegionId,
        device: &Device,
        direction: Direction,
    ) -> Result<Decision> {
        Ok(self.find(id)?.check_permission(device.id(), direction))
    }

    /// Attach `device` to region `id`.
    ///
    /// Does not re-check policy. A new entry bumps the device's reference
    /// count once; re-attaching an attached device only replaces its
    /// direction.
    pub fn attach(&mut self, id: RegionId, device: &Device, direction: Direction) -> Result<()> {
        let region = self.find_mut(id)?;
        let capacity = region.attachment_capacity();

        match region.record(device.id(), direction) {
            Some(true) => {
                device.increment();
                Ok(())
            }
            Some(false) => Ok(()),
            None => Err(Error::Full {
                region: id,
                capacity,
            }),
        }
    }

    /// Detach `device` from region `id`, dropping its reference count once.
    pub fn detach(&mut self, id: RegionId, device: &Device) -> Result<()> {
        if !self.find_mut(id)?.remove(device.id()) {
            return Err(Error::NotAttached {
                region: id,
                device: device.name().to_string(),
            });
        }
        device.decrement();
        Ok(())
    }
}
