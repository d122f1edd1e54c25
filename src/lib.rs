//! # SDP
//!
//! Region access control for a secure media pipeline.
//!
//! Hardware media devices (decrypter, parser, decoder, transformer, sink)
//! share regions of protected memory. This crate decides which device may
//! touch which region and in which direction, and keeps the books:
//!
//! - **One writer**: at most one device writes a region at a time
//! - **Downstream readers**: a device reads a region only if the writer sits
//!   strictly upstream of it, on the same stream kind (video or audio)
//! - **Reference counts**: every device knows how many regions hold it
//!
//! ## Quick Start
//!
//! ```rust
//! use sdp::prelude::*;
//!
//! let engine = Engine::new(EngineConfig::default())?;
//! let region = engine.create_region(0x1000, 4096)?;
//!
//! engine.grant(region, "delta", Direction::Write)?; // video decoder
//! engine.grant(region, "bdisp", Direction::Read)?;  // blitter, downstream
//!
//! let report = engine.report()?;
//! assert_eq!(report.device("delta").unwrap().refcount, 1);
//! # Ok::<(), sdp::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod observability;
pub mod region;
pub mod report;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::device::{DeviceId, Role, StreamKind};
    pub use crate::engine::Engine;
    pub use crate::error::{Error, Result};
    pub use crate::region::{Decision, Direction, RegionId};
    pub use crate::report::StatusReport;
}

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, Result};
