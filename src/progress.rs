//! Monotonic build-progress reporting
//!
//! Each index build reports a fraction in `[0, 1]` that an external poller
//! can read without blocking the builder. The handle stores the f64 bit
//! pattern in an atomic and advances it with `fetch_max`; for non-negative
//! floats the bit patterns order like the values, so readers can never
//! observe the fraction moving backwards.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cloneable handle on one build's progress fraction.
#[derive(Clone, Debug, Default)]
pub struct ProgressHandle {
    bits: Arc<AtomicU64>,
}

impl ProgressHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fraction in `[0, 1]`. `1.0` means the build has completed.
    pub fn fraction(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Advance the fraction. Values below the current fraction are ignored,
    /// keeping the reported value monotonic.
    pub(crate) fn report(&self, fraction: f64) {
        let clamped = fraction.clamp(0.0, 1.0);
        self.bits.fetch_max(clamped.to_bits(), Ordering::AcqRel);
    }

    /// Reset to zero at the start of a (re)build.
    pub(crate) fn reset(&self) {
        self.bits.store(0, Ordering::Release);
    }
}
