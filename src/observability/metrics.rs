//! Metrics collection using metrics-rs.

use metrics::{Unit, counter, gauge};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether metrics have been initialized.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

const REGIONS_CREATED: &str = "sdp_regions_created";
const REGIONS_DESTROYED: &str = "sdp_regions_destroyed";
const REGIONS_LIVE: &str = "sdp_regions_live";
const GRANTS: &str = "sdp_grants";
const DENIALS: &str = "sdp_denials";
const REVOCATIONS: &str = "sdp_revocations";

/// Initialize metrics descriptions.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    metrics::describe_counter!(REGIONS_CREATED, Unit::Count, "Regions allocated");
    metrics::describe_counter!(REGIONS_DESTROYED, Unit::Count, "Regions released");
    metrics::describe_gauge!(REGIONS_LIVE, Unit::Count, "Regions currently allocated");
    metrics::describe_counter!(
        GRANTS,
        Unit::Count,
        "Devices attached to a region after a permission check"
    );
    metrics::describe_counter!(DENIALS, Unit::Count, "Attach requests refused by policy");
    metrics::describe_counter!(REVOCATIONS, Unit::Count, "Devices detached from a region");
}

/// Record a region allocation.
#[inline]
pub fn record_region_created(live: usize) {
    counter!(REGIONS_CREATED).increment(1);
    gauge!(REGIONS_LIVE).set(live as f64);
}

/// Record a region release.
#[inline]
pub fn record_region_destroyed(live: usize) {
    counter!(REGIONS_DESTROYED).increment(1);
    gauge!(REGIONS_LIVE).set(live as f64);
}

/// Record a successful attach.
#[inline]
pub fn record_grant(device: &str) {
    counter!(GRANTS, "device" => device.to_string()).increment(1);
}

/// Record a refused attach.
#[inline]
pub fn record_denial(device: &str) {
    counter!(DENIALS, "device" => device.to_string()).increment(1);
}

/// Record a detach.
#[inline]
pub fn record_revocation(device: &str) {
    counter!(REVOCATIONS, "device" => device.to_string()).increment(1);
}
