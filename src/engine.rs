//! The shared engine: catalog and region table behind one lock.
//!
//! Every public method is one transaction. In particular [`Engine::grant`]
//! runs the permission check and the attach under the same lock, so two
//! callers can never both be handed write access to a region.

use crate::config::EngineConfig;
use crate::device::DeviceRegistry;
use crate::error::{Error, Result};
use crate::observability::{self, TracingConfig};
use crate::region::{Decision, Direction, Region, RegionId, RegionTable};
use crate::report::StatusReport;
use std::sync::{Mutex, MutexGuard};

struct State {
    devices: DeviceRegistry,
    regions: RegionTable,
}

/// Region access engine shared by every session.
///
/// # Example
///
/// ```rust
/// use sdp::{Engine, EngineConfig};
/// use sdp::region::Direction;
///
/// let engine = Engine::new(EngineConfig::default()).unwrap();
/// let region = engine.create_region(0x1000, 4096).unwrap();
///
/// engine.grant(region, "delta", Direction::Write).unwrap();
/// engine.grant(region, "bdisp", Direction::Read).unwrap();
/// assert!(engine.grant(region, "sti", Direction::Write).is_err());
///
/// engine.destroy_region(region).unwrap();
/// assert_eq!(engine.refcount("delta").unwrap(), 0);
/// ```
pub struct Engine {
    state: Mutex<State>,
    tracing: TracingConfig,
}

impl Engine {
    /// Build an engine with every slot free and every refcount at zero.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let devices = DeviceRegistry::new(config.devices)?;
        let regions = RegionTable::new(config.region_capacity, config.attachments_per_region);

        tracing::debug!(
            devices = devices.len(),
            region_capacity = regions.capacity(),
            attachments_per_region = regions.attachments_per_region(),
            "engine ready"
        );

        Ok(Self {
            state: Mutex::new(State { devices, regions }),
            tracing: config.tracing,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| Error::Poisoned)
    }

    /// Free every region and zero every refcount.
    pub fn init(&self) -> Result<()> {
        let _span = self.tracing.enter("init");
        let mut state = self.lock()?;
        let State { devices, regions } = &mut *state;
        regions.init(devices);
        tracing::debug!("engine reset");
        Ok(())
    }

    /// Allocate a region at `base` spanning `len` bytes.
    pub fn create_region(&self, base: u64, len: u32) -> Result<RegionId> {
        let _span = self.tracing.enter("create");
        let mut state = self.lock()?;

        let id = state.regions.create(base, len).inspect_err(|e| {
            tracing::warn!(base, len, error = %e, "region creation failed");
        })?;
        tracing::debug!(region = id.raw(), base, len, "region created");
        observability::record_region_created(state.regions.live_count());
        Ok(id)
    }

    /// Release every attachment of region `id`, then free it.
    pub fn destroy_region(&self, id: RegionId) -> Result<()> {
        let _span = self.tracing.enter("destroy");
        let mut state = self.lock()?;
        let State { devices, regions } = &mut *state;

        let attached = regions.find(id).inspect_err(warn_region(id))?.attached_count();
        regions.destroy(id, devices).inspect_err(|e| {
            tracing::warn!(region = id.raw(), error = %e, "region destruction failed");
        })?;
        tracing::debug!(region = id.raw(), released = attached, "region destroyed");
        observability::record_region_destroyed(regions.live_count());
        Ok(())
    }

    /// Snapshot of region `id`.
    pub fn find_region(&self, id: RegionId) -> Result<Region> {
        let state = self.lock()?;
        state.regions.find(id).cloned()
    }

    /// Decide, without mutating anything, whether `device` could attach.
    pub fn check_permission(
        &self,
        id: RegionId,
        device: &str,
        direction: Direction,
    ) -> Result<Decision> {
        let state = self.lock()?;
        let device = state.devices.lookup_by_name(device)?;
        state.regions.check_permission(id, device, direction)
    }

    /// Check and, if allowed, attach `device` to region `id`.
    ///
    /// Fails with [`Error::Denied`] when the policy refuses the request and
    /// with [`Error::Full`] when the region has no free attachment entry.
    pub fn grant(&self, id: RegionId, device: &str, direction: Direction) -> Result<()> {
        let _span = self.tracing.enter("grant");
        let mut state = self.lock()?;
        let State { devices, regions } = &mut *state;

        let device = devices.lookup_by_name(device).inspect_err(|_| {
            tracing::warn!(device = %device, "can't find device");
        })?;

        match regions
            .check_permission(id, device, direction)
            .inspect_err(warn_region(id))?
        {
            Decision::Allowed => {
                if self.tracing.decision_events {
                    observability::trace_allowed(id, device.name(), direction);
                }
            }
            Decision::Denied(reason) => {
                observability::trace_denied(id, device.name(), direction, reason);
                observability::record_denial(device.name());
                return Err(Error::Denied {
                    region: id,
                    device: device.name().to_string(),
                    direction,
                });
            }
        }

        regions
            .attach(id, device, direction)
            .inspect_err(warn_region(id))?;
        tracing::debug!(
            region = id.raw(),
            device = %device.name(),
            direction = %direction,
            refcount = device.refcount(),
            "device attached"
        );
        observability::record_grant(device.name());
        Ok(())
    }

    /// Detach `device` from region `id`.
    pub fn revoke(&self, id: RegionId, device: &str) -> Result<()> {
        let _span = self.tracing.enter("revoke");
        let mut state = self.lock()?;
        let State { devices, regions } = &mut *state;

        let device = devices.lookup_by_name(device).inspect_err(|_| {
            tracing::warn!(device = %device, "can't find device");
        })?;
        regions.detach(id, device).inspect_err(warn_region(id))?;
        tracing::debug!(
            region = id.raw(),
            device = %device.name(),
            refcount = device.refcount(),
            "device detached"
        );
        observability::record_revocation(device.name());
        Ok(())
    }

    /// Current reference count of `device`.
    pub fn refcount(&self, device: &str) -> Result<u32> {
        let state = self.lock()?;
        Ok(state.devices.lookup_by_name(device)?.refcount())
    }

    /// Structured snapshot of the catalog and every live region.
    pub fn report(&self) -> Result<StatusReport> {
        let state = self.lock()?;
        Ok(StatusReport::capture(&state.devices, &state.regions))
    }
}

fn warn_region(id: RegionId) -> impl Fn(&Error) {
    move |e| tracing::warn!(region = id.raw(), error = %e, "region update failed")
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("tracing", &self.tracing)
            .finish_non_exhaustive()
    }
}
