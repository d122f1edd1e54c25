//! Static catalog of secure devices.

use super::{DeviceId, Role, StreamKind};
use crate::config::MAX_NAME_LEN;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

/// Description of a catalog entry, used to build a [`DeviceRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSpec {
    /// Device name (driver name on the rich side).
    pub name: String,
    /// Typed identifier.
    pub id: DeviceId,
}

impl DeviceSpec {
    /// Create a catalog entry from a name, role and stream kind.
    pub fn new(name: impl Into<String>, role: Role, kind: StreamKind) -> Self {
        Self {
            name: name.into(),
            id: DeviceId::new(role, kind),
        }
    }
}

/// A secure device known to the engine.
///
/// Membership in the catalog never changes. Only the reference count
/// (number of regions currently holding an attachment for the device)
/// moves.
#[derive(Debug)]
pub struct Device {
    name: String,
    id: DeviceId,
    refcount: AtomicU32,
}

impl Device {
    fn new(spec: DeviceSpec) -> Self {
        Self {
            name: spec.name,
            id: spec.id,
            refcount: AtomicU32::new(0),
        }
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Typed identifier.
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Pipeline role.
    pub fn role(&self) -> Option<Role> {
        self.id.role()
    }

    /// Stream kind.
    pub fn stream_kind(&self) -> Option<StreamKind> {
        self.id.stream_kind()
    }

    /// Number of regions this device is currently attached to.
    pub fn refcount(&self) -> u32 {
        self.refcount.load(Ordering::Acquire)
    }

    /// Record one more attachment. Returns the new count.
    pub fn increment(&self) -> u32 {
        self.refcount.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Record one attachment fewer. Returns the new count.
    ///
    /// # Panics
    ///
    /// Panics if the count is already zero: attach and detach were called
    /// out of sequence and the bookkeeping can no longer be trusted.
    pub fn decrement(&self) -> u32 {
        match self
            .refcount
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(prev) => prev - 1,
            Err(_) => panic!("refcount underflow on device {:?}", self.name),
        }
    }

    fn reset(&self) {
        self.refcount.store(0, Ordering::Release);
    }
}

/// The catalog of devices, looked up by name or identifier.
#[derive(Debug)]
pub struct DeviceRegistry {
    devices: Box<[Device]>,
}

impl DeviceRegistry {
    /// Build a registry from catalog entries.
    ///
    /// Fails with [`Error::InvalidArgument`] if a name is empty, longer than
    /// [`MAX_NAME_LEN`] or duplicated, or if an identifier is the reserved
    /// word, malformed, or duplicated.
    pub fn new(specs: impl IntoIterator<Item = DeviceSpec>) -> Result<Self> {
        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        let mut devices = Vec::new();

        for spec in specs {
            if spec.name.is_empty() || spec.name.len() > MAX_NAME_LEN {
                return Err(Error::InvalidArgument(format!(
                    "device name {:?} must be 1..={MAX_NAME_LEN} bytes",
                    spec.name
                )));
            }
            if !spec.id.is_well_formed() {
                return Err(Error::InvalidArgument(format!(
                    "device {:?} has malformed identifier {}",
                    spec.name, spec.id
                )));
            }
            if !names.insert(spec.name.clone()) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate device name {:?}",
                    spec.name
                )));
            }
            if !ids.insert(spec.id) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate device identifier {}",
                    spec.id
                )));
            }
            devices.push(Device::new(spec));
        }

        Ok(Self {
            devices: devices.into_boxed_slice(),
        })
    }

    /// Exact, case-sensitive lookup by name.
    pub fn lookup_by_name(&self, name: &str) -> Result<&Device> {
        self.devices
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| Error::DeviceNotFound(name.to_string()))
    }

    /// Lookup by typed identifier.
    pub fn lookup_by_id(&self, id: DeviceId) -> Result<&Device> {
        self.devices
            .iter()
            .find(|d| d.id == id)
            .ok_or(Error::UnknownDeviceId(id))
    }

    /// Iterate over the catalog in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    /// Number of devices in the catalog.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// True if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Reset every reference count to zero.
    pub fn reset(&self) {
        for device in self.devices.iter() {
            device.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::reference_catalog;

    fn registry() -> DeviceRegistry {
        DeviceRegistry::new(reference_catalog()).unwrap()
    }

    #[test]
    fn test_lookup_by_name() {
        let reg = registry();
        assert_eq!(reg.len(), 3);

        let delta = reg.lookup_by_name("delta").unwrap();
        assert_eq!(delta.role(), Some(Role::Decoder));
        assert_eq!(delta.stream_kind(), Some(StreamKind::Video));
        assert_eq!(delta.refcount(), 0);

        assert_eq!(
            reg.lookup_by_name("sti").unwrap().role(),
            Some(Role::Sink)
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let reg = registry();
        assert_eq!(
            reg.lookup_by_name("Delta").unwrap_err(),
            Error::DeviceNotFound("Delta".into())
        );
        assert!(reg.lookup_by_name("").is_err());
    }

    #[test]
    fn test_lookup_by_id() {
        let reg = registry();
        let id = DeviceId::new(Role::Transformer, StreamKind::Video);
        assert_eq!(reg.lookup_by_id(id).unwrap().name(), "bdisp");
        assert_eq!(
            reg.lookup_by_id(DeviceId::NONE).unwrap_err(),
            Error::UnknownDeviceId(DeviceId::NONE)
        );
    }

    #[test]
    fn test_refcount_increment_decrement() {
        let reg = registry();
        let bdisp = reg.lookup_by_name("bdisp").unwrap();

        assert_eq!(bdisp.increment(), 1);
        assert_eq!(bdisp.increment(), 2);
        assert_eq!(bdisp.decrement(), 1);
        assert_eq!(bdisp.refcount(), 1);

        reg.reset();
        assert_eq!(bdisp.refcount(), 0);
    }

    #[test]
    #[should_panic(expected = "refcount underflow")]
    fn test_decrement_below_zero_panics() {
        let reg = registry();
        reg.lookup_by_name("sti").unwrap().decrement();
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = DeviceRegistry::new([
            DeviceSpec::new("delta", Role::Decoder, StreamKind::Video),
            DeviceSpec::new("delta", Role::Sink, StreamKind::Video),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = DeviceRegistry::new([
            DeviceSpec::new("a", Role::Decoder, StreamKind::Audio),
            DeviceSpec::new("b", Role::Decoder, StreamKind::Audio),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_bad_names_and_ids() {
        assert!(DeviceRegistry::new([DeviceSpec::new("", Role::Sink, StreamKind::Video)]).is_err());
        assert!(
            DeviceRegistry::new([DeviceSpec::new(
                "x".repeat(MAX_NAME_LEN + 1),
                Role::Sink,
                StreamKind::Video
            )])
            .is_err()
        );
        assert!(
            DeviceRegistry::new([DeviceSpec {
                name: "ghost".into(),
                id: DeviceId::NONE,
            }])
            .is_err()
        );
    }
}
