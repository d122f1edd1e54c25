//! Tracing integration for structured logging and spans.

use crate::region::{Denial, Direction, RegionId};
use tracing::{Level, Span, span};

/// Configuration for tracing behavior.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Whether to create a span around each engine transaction.
    pub transaction_spans: bool,
    /// Whether to log each permission decision at debug level.
    pub decision_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            transaction_spans: true,
            decision_events: false,
        }
    }
}

impl TracingConfig {
    /// Spans and decision events.
    pub fn all() -> Self {
        Self {
            transaction_spans: true,
            decision_events: true,
        }
    }

    /// Disable all spans and decision events.
    pub fn none() -> Self {
        Self {
            transaction_spans: false,
            decision_events: false,
        }
    }

    /// Enter a transaction span, or a disabled one if spans are off.
    pub fn enter(&self, op: &'static str) -> tracing::span::EnteredSpan {
        if self.transaction_spans {
            span_transaction(op).entered()
        } else {
            Span::none().entered()
        }
    }
}

/// Create a span for one engine transaction.
///
/// # Example
///
/// ```rust,ignore
/// use sdp::observability::span_transaction;
///
/// let _guard = span_transaction("grant").entered();
/// // check + attach happen here
/// ```
#[inline]
pub fn span_transaction(op: &'static str) -> Span {
    span!(Level::DEBUG, "sdp", op = op)
}

/// Log a refused permission check.
#[inline]
pub fn trace_denied(region: RegionId, device: &str, direction: Direction, reason: Denial) {
    tracing::warn!(
        region = region.raw(),
        device = %device,
        direction = %direction,
        reason = %reason,
        "permission denied"
    );
}

/// Log a permission check that passed.
#[inline]
pub fn trace_allowed(region: RegionId, device: &str, direction: Direction) {
    tracing::debug!(
        region = region.raw(),
        device = %device,
        direction = %direction,
        "permission allowed"
    );
}
