//! Secure devices of the media pipeline.
//!
//! - [`DeviceId`]: 32-bit identifier packing a [`Role`] and a [`StreamKind`]
//! - [`DeviceRegistry`]: the immutable catalog, with live reference counts

mod id;
mod registry;

pub use id::{DeviceId, Role, StreamKind};
pub use registry::{Device, DeviceRegistry, DeviceSpec};
