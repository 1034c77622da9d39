//! Resolution metrics.
//!
//! Counts how often reads are served by the active language, by a fallback
//! language or by a static fallback value, and how often writes are redirected
//! to the default language. Missing translations are a data-quality signal,
//! not an error, so this is where they surface.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Resolution counters for one translator.
#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    /// Reads answered by the active language's shadow field
    direct_hits: AtomicUsize,

    /// Reads answered by a language from the fallback chain
    fallback_hits: AtomicUsize,

    /// Reads that exhausted the chain and returned the static fallback value
    static_fallbacks: AtomicUsize,

    /// Writes redirected to the default language's shadow field
    redirected_writes: AtomicUsize,
}

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_direct_hit(&self) {
        self.direct_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback_hit(&self) {
        self.fallback_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_static_fallback(&self) {
        self.static_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_redirected_write(&self) {
        self.redirected_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn direct_hits(&self) -> usize {
        self.direct_hits.load(Ordering::Relaxed)
    }

    pub fn fallback_hits(&self) -> usize {
        self.fallback_hits.load(Ordering::Relaxed)
    }

    pub fn static_fallbacks(&self) -> usize {
        self.static_fallbacks.load(Ordering::Relaxed)
    }

    pub fn redirected_writes(&self) -> usize {
        self.redirected_writes.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let direct = self.direct_hits();
        let fallback = self.fallback_hits();
        let fixed = self.static_fallbacks();
        let total_reads = direct + fallback + fixed;
        let translated_rate = if total_reads > 0 {
            (direct as f64 / total_reads as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            direct_hits: direct,
            fallback_hits: fallback,
            static_fallbacks: fixed,
            total_reads,
            translated_rate,
            redirected_writes: self.redirected_writes(),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.direct_hits.store(0, Ordering::Relaxed);
        self.fallback_hits.store(0, Ordering::Relaxed);
        self.static_fallbacks.store(0, Ordering::Relaxed);
        self.redirected_writes.store(0, Ordering::Relaxed);
    }
}

/// Snapshot of resolution statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub direct_hits: usize,
    pub fallback_hits: usize,
    pub static_fallbacks: usize,
    pub total_reads: usize,

    /// Share of reads served by the active language, as a percentage (0-100)
    pub translated_rate: f64,

    pub redirected_writes: usize,
}
