//! Regions of secure memory and the devices attached to them.
//!
//! # Architecture
//!
//! - [`Direction`]: access requested by a device (read, write or both)
//! - [`Region`]: base address, length, writer and attachment set
//! - [`RegionTable`]: fixed pool of region slots with lowest-index allocation
//!
//! The permission rule lives on [`Region::check_permission`]: one writer at a
//! time, and readers only downstream of that writer on the same stream kind.

mod access;
mod record;
mod table;

pub use access::Direction;
pub use record::{Attachment, Decision, Denial, Region, RegionId};
pub use table::RegionTable;
