//! Request boundary: command decoding, dispatch and status rendering.
//!
//! The secure-world entry point receives four commands from the rich side.
//! This module turns their primitive parameters into a [`Command`], runs it
//! against a shared [`Engine`] and renders the status snapshot as text. The
//! transport itself (parameter marshaling, session handling) stays outside.
//!
//! | Code | Command | Parameters |
//! |------|---------|------------|
//! | 0 | create region | address (MSB, LSB), size → region id |
//! | 1 | destroy region | region id |
//! | 2 | update region | region id, add/remove, device name, direction |
//! | 3 | dump status | output buffer |

use crate::config::MAX_NAME_LEN;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::region::{Direction, RegionId};
use crate::report::StatusReport;
use std::fmt;
use std::sync::Arc;

/// Numeric command identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CommandCode {
    /// Allocate a region.
    CreateRegion = 0,
    /// Free a region.
    DestroyRegion = 1,
    /// Attach or detach a device.
    UpdateRegion = 2,
    /// Render the status transcript.
    DumpStatus = 3,
}

impl TryFrom<u32> for CommandCode {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(CommandCode::CreateRegion),
            1 => Ok(CommandCode::DestroyRegion),
            2 => Ok(CommandCode::UpdateRegion),
            3 => Ok(CommandCode::DumpStatus),
            other => Err(Error::InvalidArgument(format!("unknown command {other}"))),
        }
    }
}

/// What an update command does to the region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Update {
    /// Check permission, then attach in this direction.
    Attach(Direction),
    /// Detach the device.
    Detach,
}

/// A decoded request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Allocate a region.
    CreateRegion {
        /// Base address.
        addr: u64,
        /// Length in bytes.
        size: u32,
    },
    /// Free a region.
    DestroyRegion {
        /// Region to free.
        id: RegionId,
    },
    /// Attach or detach a device.
    UpdateRegion {
        /// Target region.
        id: RegionId,
        /// Device name.
        device: String,
        /// Attach or detach.
        update: Update,
    },
    /// Snapshot the engine.
    DumpStatus,
}

impl Command {
    /// Numeric identifier of this command.
    pub fn code(&self) -> CommandCode {
        match self {
            Command::CreateRegion { .. } => CommandCode::CreateRegion,
            Command::DestroyRegion { .. } => CommandCode::DestroyRegion,
            Command::UpdateRegion { .. } => CommandCode::UpdateRegion,
            Command::DumpStatus => CommandCode::DumpStatus,
        }
    }

    /// Decode an update request from its raw parameters.
    ///
    /// `add` is nonzero to attach. The direction code is only read when
    /// attaching. The name may carry a trailing NUL terminator.
    pub fn update_from_raw(id: u32, add: u32, name: &[u8], direction: u32) -> Result<Self> {
        let update = if add != 0 {
            Update::Attach(Direction::from_raw(direction)?)
        } else {
            Update::Detach
        };
        Ok(Command::UpdateRegion {
            id: RegionId::new(id),
            device: decode_name(name)?,
            update,
        })
    }
}

/// Assemble a 64-bit address from its two 32-bit halves.
pub const fn addr_from_parts(msb: u32, lsb: u32) -> u64 {
    ((msb as u64) << 32) | lsb as u64
}

fn decode_name(raw: &[u8]) -> Result<String> {
    let raw = match raw.iter().position(|&b| b == 0) {
        Some(end) => &raw[..end],
        None => raw,
    };
    if raw.is_empty() || raw.len() > MAX_NAME_LEN {
        return Err(Error::InvalidArgument(format!(
            "device name must be 1..={MAX_NAME_LEN} bytes, got {}",
            raw.len()
        )));
    }
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|e| Error::InvalidArgument(format!("device name is not UTF-8: {e}")))
}

/// Result of a dispatched command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// A region was created.
    Region(RegionId),
    /// The command completed with no output.
    Done,
    /// Engine snapshot.
    Status(StatusReport),
}

/// Runs decoded commands against a shared engine.
///
/// One dispatcher per session; all of them share the same [`Engine`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    engine: Arc<Engine>,
}

impl Dispatcher {
    /// Create a dispatcher for `engine`.
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// The shared engine.
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Run one command.
    pub fn invoke(&self, command: Command) -> Result<Response> {
        tracing::trace!(code = ?command.code(), "invoke");
        match command {
            Command::CreateRegion { addr, size } => {
                self.engine.create_region(addr, size).map(Response::Region)
            }
            Command::DestroyRegion { id } => {
                self.engine.destroy_region(id)?;
                Ok(Response::Done)
            }
            Command::UpdateRegion {
                id,
                device,
                update: Update::Attach(direction),
            } => {
                self.engine.grant(id, &device, direction)?;
                Ok(Response::Done)
            }
            Command::UpdateRegion {
                id,
                device,
                update: Update::Detach,
            } => {
                self.engine.revoke(id, &device)?;
                Ok(Response::Done)
            }
            Command::DumpStatus => self.engine.report().map(Response::Status),
        }
    }
}

/// Human-readable rendering of a [`StatusReport`].
///
/// ```text
/// SDP status
/// device delta id 0x3010000 (decoder/video) refcount 1
/// region 0 addr 0x1000 size 4096 writer 0x3010000
///   attached 0x3010000 (delta) direction -w
/// ```
pub struct StatusTranscript<'a>(pub &'a StatusReport);

impl StatusTranscript<'_> {
    /// Write the transcript into `buf`, truncating at its end.
    ///
    /// Returns the number of bytes written.
    pub fn fill(&self, buf: &mut [u8]) -> usize {
        let text = self.to_string();
        let n = text.len().min(buf.len());
        buf[..n].copy_from_slice(&text.as_bytes()[..n]);
        n
    }
}

impl fmt::Display for StatusTranscript<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "SDP status")?;

        for device in &report.devices {
            write!(f, "device {} id {}", device.name, device.id)?;
            if let (Some(role), Some(kind)) = (device.role(), device.stream_kind()) {
                write!(f, " ({role}/{kind})")?;
            }
            writeln!(f, " refcount {}", device.refcount)?;
        }

        for region in &report.regions {
            write!(
                f,
                "region {} addr {:#x} size {} writer ",
                region.id, region.base, region.len
            )?;
            match region.writer {
                Some(writer) => writeln!(f, "{writer}")?,
                None => writeln!(f, "none")?,
            }
            for attachment in &region.attachments {
                let name = report
                    .devices
                    .iter()
                    .find(|d| d.id == attachment.device)
                    .map_or("?", |d| d.name.as_str());
                writeln!(
                    f,
                    "  attached {} ({name}) direction {}",
                    attachment.device, attachment.direction
                )?;
            }
        }
        Ok(())
    }
}
