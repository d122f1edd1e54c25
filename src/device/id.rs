//! Typed device identifiers.
//!
//! A device identifier packs the pipeline role and the stream kind of a
//! device into a single 32-bit word:
//!
//! ```text
//! ┌──────────────┬──────────────┬─────────────────────────────┐
//! │ role (31-24) │ kind (23-16) │ reserved (15-0)             │
//! └──────────────┴──────────────┴─────────────────────────────┘
//! ```
//!
//! The all-zero word is reserved and never names a device.

use std::fmt;

const ROLE_SHIFT: u32 = 24;
const KIND_SHIFT: u32 = 16;
const ROLE_MASK: u32 = 0xFF00_0000;
const KIND_MASK: u32 = 0x00FF_0000;

/// Position of a device in the media pipeline.
///
/// Variants are declared upstream to downstream, so the derived ordering
/// is the pipeline ordering: `Decrypter < Parser < Decoder < Transformer < Sink`.
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
#[repr(u8)]
pub enum Role {
    /// Removes the content protection.
    Decrypter = 1,
    /// Splits a container into elementary streams.
    Parser = 2,
    /// Decodes compressed frames.
    Decoder = 3,
    /// Scales, converts or composes decoded frames.
    Transformer = 4,
    /// Presents the data (display, audio output).
    Sink = 5,
}

impl Role {
    /// All roles, upstream first.
    pub const ALL: [Role; 5] = [
        Role::Decrypter,
        Role::Parser,
        Role::Decoder,
        Role::Transformer,
        Role::Sink,
    ];

    /// Decode a role from its raw byte.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Role::Decrypter),
            2 => Some(Role::Parser),
            3 => Some(Role::Decoder),
            4 => Some(Role::Transformer),
            5 => Some(Role::Sink),
            _ => None,
        }
    }

    /// True if `self` sits strictly before `other` in the pipeline.
    #[inline]
    pub fn is_upstream_of(self, other: Role) -> bool {
        self < other
    }

    /// Lowercase name used in status transcripts.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Decrypter => "decrypter",
            Role::Parser => "parser",
            Role::Decoder => "decoder",
            Role::Transformer => "transformer",
            Role::Sink => "sink",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media type carried by a device.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize,
)]
#[rkyv(derive(Debug))]
#[repr(u8)]
pub enum StreamKind {
    /// Video frames.
    Video = 1,
    /// Audio samples.
    Audio = 2,
}

impl StreamKind {
    /// Decode a stream kind from its raw byte.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(StreamKind::Video),
            2 => Some(StreamKind::Audio),
            _ => None,
        }
    }

    /// Lowercase name used in status transcripts.
    pub const fn as_str(self) -> &'static str {
        match self {
            StreamKind::Video => "video",
            StreamKind::Audio => "audio",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 32-bit device identifier encoding role and stream kind.
#[derive(
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
#[rkyv(derive(Debug))]
#[repr(transparent)]
pub struct DeviceId(u32);

impl DeviceId {
    /// The reserved "no device" word.
    pub const NONE: Self = Self(0);

    /// Build an identifier from a role and a stream kind.
    pub const fn new(role: Role, kind: StreamKind) -> Self {
        Self(((role as u32) << ROLE_SHIFT) | ((kind as u32) << KIND_SHIFT))
    }

    /// Wrap a raw identifier word without validation.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw identifier word.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// True for the reserved "no device" word.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Decoded pipeline role, if the role byte is a known role.
    pub const fn role(self) -> Option<Role> {
        Role::from_raw(((self.0 & ROLE_MASK) >> ROLE_SHIFT) as u8)
    }

    /// Decoded stream kind, if the kind byte is a known kind.
    pub const fn stream_kind(self) -> Option<StreamKind> {
        StreamKind::from_raw(((self.0 & KIND_MASK) >> KIND_SHIFT) as u8)
    }

    /// True if both role and stream kind decode to known values.
    pub const fn is_well_formed(self) -> bool {
        self.role().is_some() && self.stream_kind().is_some()
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.role(), self.stream_kind()) {
            (Some(role), Some(kind)) => write!(f, "DeviceId({role}|{kind})"),
            _ => write!(f, "DeviceId({:#x})", self.0),
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_matches_bit_layout() {
        assert_eq!(DeviceId::new(Role::Decoder, StreamKind::Video).raw(), 0x0301_0000);
        assert_eq!(DeviceId::new(Role::Transformer, StreamKind::Video).raw(), 0x0401_0000);
        assert_eq!(DeviceId::new(Role::Sink, StreamKind::Audio).raw(), 0x0502_0000);
        assert_eq!(DeviceId::new(Role::Decrypter, StreamKind::Audio).raw(), 0x0102_0000);
    }

    #[test]
    fn test_decode_role_and_kind() {
        for role in Role::ALL {
            for kind in [StreamKind::Video, StreamKind::Audio] {
                let id = DeviceId::new(role, kind);
                assert_eq!(id.role(), Some(role));
                assert_eq!(id.stream_kind(), Some(kind));
                assert!(id.is_well_formed());
                assert!(!id.is_none());
            }
        }
    }

    #[test]
    fn test_reserved_bits_ignored_on_decode() {
        let id = DeviceId::from_raw(0x0301_00ff);
        assert_eq!(id.role(), Some(Role::Decoder));
        assert_eq!(id.stream_kind(), Some(StreamKind::Video));
    }

    #[test]
    fn test_none_and_malformed() {
        assert!(DeviceId::NONE.is_none());
        assert_eq!(DeviceId::NONE.role(), None);
        assert!(!DeviceId::from_raw(0x0900_0000).is_well_formed());
        assert!(!DeviceId::from_raw(0x0300_0000).is_well_formed());
    }

    #[test]
    fn test_role_order_is_pipeline_order() {
        assert!(Role::Decrypter.is_upstream_of(Role::Parser));
        assert!(Role::Decoder.is_upstream_of(Role::Transformer));
        assert!(Role::Decoder.is_upstream_of(Role::Sink));
        assert!(Role::Transformer.is_upstream_of(Role::Sink));
        assert!(!Role::Sink.is_upstream_of(Role::Decoder));
        assert!(!Role::Decoder.is_upstream_of(Role::Decoder));
    }

    #[test]
    fn test_display_formats() {
        let id = DeviceId::new(Role::Decoder, StreamKind::Video);
        assert_eq!(id.to_string(), "0x3010000");
        assert_eq!(format!("{id:?}"), "DeviceId(decoder|video)");
        assert_eq!(format!("{:?}", DeviceId::NONE), "DeviceId(0x0)");
    }
}
