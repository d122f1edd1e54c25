//! Observability features: metrics and tracing.
//!
//! ## Metrics
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `sdp_regions_created` | Counter | Regions allocated |
//! | `sdp_regions_destroyed` | Counter | Regions released |
//! | `sdp_regions_live` | Gauge | Regions currently allocated |
//! | `sdp_grants` | Counter | Successful attaches, by device |
//! | `sdp_denials` | Counter | Refused attaches, by device |
//! | `sdp_revocations` | Counter | Detaches, by device |
//!
//! ## Tracing
//!
//! Each engine transaction runs in an `sdp` span carrying the operation name.
//! Denials are logged at warn level; mutations at debug level.

mod metrics;
mod tracing_support;

pub use self::metrics::{
    init_metrics, record_denial, record_grant, record_region_created, record_region_destroyed,
    record_revocation,
};
pub use tracing_support::{TracingConfig, span_transaction, trace_allowed, trace_denied};
