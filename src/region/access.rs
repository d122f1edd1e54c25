//! Access direction requested for a region.

use crate::error::{Error, Result};
use std::fmt;

/// Access direction a device is granted on a region.
///
/// The raw codes line up with the DMA data direction codes used by the
/// rich-side drivers: `0` read+write, `1` read, `2` write.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize,
)]
#[rkyv(derive(Debug))]
#[repr(u8)]
pub enum Direction {
    /// Read and write.
    ReadWrite = 0,
    /// Read only. Downstream consumers of a buffer.
    Read = 1,
    /// Write only. The producer of a buffer.
    Write = 2,
}

impl Direction {
    /// Decode a raw direction code.
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(Direction::ReadWrite),
            1 => Ok(Direction::Read),
            2 => Ok(Direction::Write),
            other => Err(Error::InvalidArgument(format!(
                "unknown access direction {other}"
            ))),
        }
    }

    /// The raw direction code.
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Check if this direction allows reading.
    #[inline]
    pub fn can_read(self) -> bool {
        matches!(self, Direction::Read | Direction::ReadWrite)
    }

    /// Check if this direction allows writing.
    #[inline]
    pub fn can_write(self) -> bool {
        matches!(self, Direction::Write | Direction::ReadWrite)
    }
}

impl TryFrom<u32> for Direction {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self> {
        Self::from_raw(raw)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ReadWrite => write!(f, "rw"),
            Direction::Read => write!(f, "r-"),
            Direction::Write => write!(f, "-w"),
        }
    }
}
