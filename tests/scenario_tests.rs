//! End-to-end scenarios on the reference catalog.
//!
//! These tests drive a decode → transform → display session through the
//! engine and check the bookkeeping invariants after every step.

use sdp::device::{DeviceId, DeviceSpec, Role, StreamKind};
use sdp::prelude::*;
use sdp::region::Denial;
use std::collections::HashSet;

fn engine() -> Engine {
    Engine::new(EngineConfig::default()).unwrap()
}

/// The writer, if any, is attached with a direction that includes write.
fn assert_writer_attached(engine: &Engine, id: RegionId) {
    let region = engine.find_region(id).unwrap();
    if let Some(writer) = region.writer() {
        let direction = region
            .direction_of(writer)
            .expect("writer must be in the attachment set");
        assert!(direction.can_write());
    }
}

// ============================================================================
// Reference Session
// ============================================================================

#[test]
fn test_decoder_writes_transformer_reads() {
    let engine = engine();

    let id = engine.create_region(0x1000, 4096).unwrap();
    assert_eq!(id, RegionId::new(0));

    let region = engine.find_region(id).unwrap();
    assert_eq!(region.writer(), None);
    assert_eq!(region.attached_count(), 0);

    // delta: decoder, video
    assert!(
        engine
            .check_permission(id, "delta", Direction::Write)
            .unwrap()
            .is_allowed()
    );
    engine.grant(id, "delta", Direction::Write).unwrap();
    assert_eq!(engine.refcount("delta").unwrap(), 1);
    assert_eq!(
        engine.find_region(id).unwrap().writer(),
        Some(DeviceId::new(Role::Decoder, StreamKind::Video))
    );
    assert_writer_attached(&engine, id);

    // bdisp: transformer, video
    assert!(
        engine
            .check_permission(id, "bdisp", Direction::Read)
            .unwrap()
            .is_allowed()
    );
    engine.grant(id, "bdisp", Direction::Read).unwrap();
    assert_eq!(engine.refcount("bdisp").unwrap(), 1);
    assert_writer_attached(&engine, id);

    // sti: sink, video. Cannot take write while delta holds it.
    assert_eq!(
        engine.check_permission(id, "sti", Direction::Write).unwrap(),
        Decision::Denied(Denial::WriterHeld(DeviceId::new(
            Role::Decoder,
            StreamKind::Video
        )))
    );
    assert!(matches!(
        engine.grant(id, "sti", Direction::Write),
        Err(Error::Denied { .. })
    ));
    assert_eq!(engine.refcount("sti").unwrap(), 0);

    // Destroy with both attached releases both.
    engine.destroy_region(id).unwrap();
    assert_eq!(engine.refcount("delta").unwrap(), 0);
    assert_eq!(engine.refcount("bdisp").unwrap(), 0);
    assert_eq!(
        engine.find_region(id).unwrap_err(),
        Error::RegionNotFound(id)
    );
}

#[test]
fn test_pool_exhausted_on_21st_create() {
    let engine = engine();
    for i in 0..20u32 {
        let id = engine.create_region(0x1000 * u64::from(i + 1), 4096).unwrap();
        assert_eq!(id.raw(), i);
    }
    assert_eq!(
        engine.create_region(0x100_0000, 4096).unwrap_err(),
        Error::Exhausted { capacity: 20 }
    );
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_ids_unique_among_live_regions() {
    let engine = engine();
    let ids: Vec<_> = (0..5)
        .map(|_| engine.create_region(0x1000, 16).unwrap())
        .collect();

    engine.destroy_region(ids[3]).unwrap();
    engine.destroy_region(ids[1]).unwrap();

    assert_eq!(engine.create_region(0x2000, 16).unwrap(), ids[1]);
    assert_eq!(engine.create_region(0x2000, 16).unwrap(), ids[3]);
    assert_eq!(engine.create_region(0x2000, 16).unwrap(), RegionId::new(5));

    let report = engine.report().unwrap();
    let live: HashSet<_> = report.regions.iter().map(|r| r.id).collect();
    assert_eq!(report.regions.len(), 6);
    assert_eq!(live.len(), report.regions.len());
}

#[test]
fn test_attach_detach_restores_refcount_and_writer() {
    let engine = engine();
    let id = engine.create_region(0x1000, 4096).unwrap();
    let other = engine.create_region(0x2000, 4096).unwrap();
    engine.grant(other, "bdisp", Direction::Write).unwrap();

    let before = engine.refcount("bdisp").unwrap();
    engine.grant(id, "bdisp", Direction::Write).unwrap();
    engine.revoke(id, "bdisp").unwrap();

    assert_eq!(engine.refcount("bdisp").unwrap(), before);
    assert_eq!(engine.find_region(id).unwrap().writer(), None);

    // Region is writable again by anyone.
    engine.grant(id, "sti", Direction::Write).unwrap();
    assert_writer_attached(&engine, id);
}

#[test]
fn test_write_permission_matrix() {
    let engine = engine();
    let id = engine.create_region(0x1000, 4096).unwrap();

    for name in ["delta", "bdisp", "sti"] {
        assert!(
            engine
                .check_permission(id, name, Direction::Write)
                .unwrap()
                .is_allowed()
        );
    }

    engine.grant(id, "bdisp", Direction::Write).unwrap();
    for (name, allowed) in [("delta", false), ("bdisp", true), ("sti", false)] {
        let decision = engine.check_permission(id, name, Direction::Write).unwrap();
        assert_eq!(decision.is_allowed(), allowed, "{name}");
    }
}

#[test]
fn test_read_permission_matrix() {
    let engine = engine();
    let id = engine.create_region(0x1000, 4096).unwrap();

    // No writer: nobody reads.
    for name in ["delta", "bdisp", "sti"] {
        assert!(
            !engine
                .check_permission(id, name, Direction::Read)
                .unwrap()
                .is_allowed()
        );
    }

    // Transformer writes: only the sink is downstream.
    engine.grant(id, "bdisp", Direction::Write).unwrap();
    for (name, allowed) in [("delta", false), ("bdisp", false), ("sti", true)] {
        let decision = engine.check_permission(id, name, Direction::Read).unwrap();
        assert_eq!(decision.is_allowed(), allowed, "{name}");
    }
}

#[test]
fn test_cross_stream_read_denied() {
    let config = EngineConfig::default()
        .with_device(DeviceSpec::new("aud-sink", Role::Sink, StreamKind::Audio));
    let engine = Engine::new(config).unwrap();
    let id = engine.create_region(0x1000, 4096).unwrap();
    engine.grant(id, "delta", Direction::Write).unwrap();

    assert_eq!(
        engine.check_permission(id, "aud-sink", Direction::Read).unwrap(),
        Decision::Denied(Denial::StreamKindMismatch)
    );
}

#[test]
fn test_destroy_releases_every_attachment_once() {
    let engine = engine();
    let a = engine.create_region(0x1000, 4096).unwrap();
    let b = engine.create_region(0x2000, 4096).unwrap();

    engine.grant(a, "delta", Direction::Write).unwrap();
    engine.grant(a, "bdisp", Direction::Read).unwrap();
    engine.grant(a, "sti", Direction::Read).unwrap();
    engine.grant(b, "delta", Direction::Write).unwrap();
    engine.grant(b, "sti", Direction::Read).unwrap();

    engine.destroy_region(a).unwrap();

    let report = engine.report().unwrap();
    assert_eq!(report.device("delta").unwrap().refcount, 1);
    assert_eq!(report.device("bdisp").unwrap().refcount, 0);
    assert_eq!(report.device("sti").unwrap().refcount, 1);
    assert_eq!(report.regions.len(), 1);
    assert_eq!(report.regions[0].id, b);
}

#[test]
fn test_region_full_is_recoverable() {
    let engine = Engine::new(EngineConfig::default().with_attachments_per_region(2)).unwrap();
    let id = engine.create_region(0x1000, 4096).unwrap();

    engine.grant(id, "delta", Direction::Write).unwrap();
    engine.grant(id, "sti", Direction::Read).unwrap();
    assert_eq!(
        engine.grant(id, "bdisp", Direction::Read).unwrap_err(),
        Error::Full {
            region: id,
            capacity: 2
        }
    );
    assert_eq!(engine.refcount("bdisp").unwrap(), 0);

    engine.revoke(id, "sti").unwrap();
    engine.grant(id, "bdisp", Direction::Read).unwrap();
    assert_eq!(engine.refcount("bdisp").unwrap(), 1);
}

#[test]
fn test_revoke_unattached_device() {
    let engine = engine();
    let id = engine.create_region(0x1000, 4096).unwrap();
    assert!(matches!(
        engine.revoke(id, "sti"),
        Err(Error::NotAttached { .. })
    ));
}
