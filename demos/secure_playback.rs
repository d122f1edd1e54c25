//! Secure playback session through the command boundary.
//!
//! A video decoder fills a frame buffer, the blitter reads it, the display
//! reads the blitter's output, and a rogue write attempt is refused.
//!
//! Run with `RUST_LOG=sdp=debug` to see the engine's events.

use sdp::command::{Command, Dispatcher, Response, StatusTranscript, addr_from_parts};
use sdp::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn create(dispatcher: &Dispatcher, addr: u64, size: u32) -> Result<RegionId> {
    match dispatcher.invoke(Command::CreateRegion { addr, size })? {
        Response::Region(id) => Ok(id),
        other => Err(Error::InvalidArgument(format!("unexpected {other:?}"))),
    }
}

fn attach(dispatcher: &Dispatcher, id: RegionId, device: &str, direction: Direction) -> Result<()> {
    dispatcher
        .invoke(Command::update_from_raw(
            id.raw(),
            1,
            device.as_bytes(),
            direction.raw(),
        )?)
        .map(|_| ())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    sdp::observability::init_metrics();
    let engine = Arc::new(Engine::new(EngineConfig::default())?);
    let dispatcher = Dispatcher::new(engine);

    println!("=== Secure Playback ===\n");

    // Decoded frame, then the scaled frame the display scans out.
    let decoded = create(&dispatcher, addr_from_parts(0, 0x8000_0000), 0x7e_9000)?;
    let scaled = create(&dispatcher, addr_from_parts(0, 0x8100_0000), 0x7e_9000)?;
    println!("regions: decoded={decoded} scaled={scaled}");

    attach(&dispatcher, decoded, "delta", Direction::Write)?;
    attach(&dispatcher, decoded, "bdisp", Direction::Read)?;
    attach(&dispatcher, scaled, "bdisp", Direction::Write)?;
    attach(&dispatcher, scaled, "sti", Direction::Read)?;

    match attach(&dispatcher, decoded, "sti", Direction::Write) {
        Err(e) => println!("refused: {e}"),
        Ok(()) => println!("unexpected: display took write access"),
    }

    if let Response::Status(report) = dispatcher.invoke(Command::DumpStatus)? {
        println!("\n{}", StatusTranscript(&report));
    }

    dispatcher.invoke(Command::DestroyRegion { id: decoded })?;
    dispatcher.invoke(Command::DestroyRegion { id: scaled })?;

    if let Response::Status(report) = dispatcher.invoke(Command::DumpStatus)? {
        println!("after teardown:\n{}", StatusTranscript(&report));
    }

    Ok(())
}
