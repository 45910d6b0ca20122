//! Cumulative allocator counters.
//!
//! [`AllocMetrics`] is updated on every allocation and read by the
//! engine's telemetry overlay or by capacity-planning tests.

/// Counters accumulated since the allocator was created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllocMetrics {
    /// Number of committed allocations.
    pub allocations: u64,
    /// Total bytes handed out.
    pub bytes_committed: u64,
    /// Number of times the cursor wrapped back to the base.
    pub wraps: u64,
    /// Candidates rejected because they overlapped the pinned zone.
    pub pin_rejections: u64,
    /// Candidates rejected because they overlapped a zone being loaded.
    pub protected_rejections: u64,
    /// Candidates rejected because an active sprite reads the zone.
    pub liveness_rejections: u64,
    /// Directory slots cleared by commits.
    pub evictions: u64,
    /// Allocations that failed with `CapacityExhausted`.
    pub exhaustion_failures: u64,
}

impl AllocMetrics {
    /// Total rejected candidates, for any reason.
    pub fn rejections(&self) -> u64 {
        self.pin_rejections + self.protected_rejections + self.liveness_rejections
    }
}
