//! Lightweight performance timing utilities.
//!
//! Timing is off unless `enable_timing()` was called or the `VS_TIMING`
//! environment variable is set. Summaries go through `tracing`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("VS_TIMING").is_ok()
}

/// Wall-clock timer that only measures when timing is enabled.
pub struct Timer {
    start: Instant,
    enabled: bool,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        if self.enabled {
            Some(self.start.elapsed().as_secs_f64())
        } else {
            None
        }
    }

    /// Stop the timer and record it into an accumulator when enabled.
    pub fn stop_into(self, acc: &AccumulatingTimer) {
        if let Some(elapsed) = self.stop() {
            acc.record(elapsed);
        }
    }
}

/// Accumulating timer for tracking total time across multiple calls.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Record a timing measurement.
    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Total time spent (in seconds).
    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Average time per call (in seconds).
    pub fn average_seconds(&self) -> f64 {
        let count = self.count();
        if count > 0 {
            self.total_seconds() / count as f64
        } else {
            0.0
        }
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Accumulators for the per-evaluation hot path.
pub mod solver_timing {
    use super::AccumulatingTimer;

    /// Forward FFT, spectral division and inverse FFT.
    pub static POISSON_SOLVES: AccumulatingTimer = AccumulatingTimer::new();
    /// Full right-hand-side evaluations (includes the Poisson solve).
    pub static RHS_EVALS: AccumulatingTimer = AccumulatingTimer::new();

    pub fn reset_all() {
        POISSON_SOLVES.reset();
        RHS_EVALS.reset();
    }

    /// Log the hot-path breakdown.
    pub fn log_summary() {
        if !super::is_enabled() {
            return;
        }
        for (name, acc) in [("poisson", &POISSON_SOLVES), ("rhs", &RHS_EVALS)] {
            let count = acc.count();
            if count > 0 {
                tracing::info!(
                    target: "vs_timing",
                    name,
                    calls = count,
                    total_s = acc.total_seconds(),
                    avg_ms = acc.average_seconds() * 1000.0,
                    "hot path"
                );
            }
        }
    }
}

/// Per-run wall-clock breakdown.
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub build_time_s: f64,
    pub integrate_time_s: f64,
    pub save_time_s: f64,
    pub load_time_s: f64,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub rhs_evals: usize,
}

impl PerfStats {
    /// Log a summary of the statistics, then the hot-path breakdown.
    pub fn log_summary(&self) {
        if !is_enabled() {
            return;
        }
        tracing::info!(
            target: "vs_timing",
            build_s = self.build_time_s,
            integrate_s = self.integrate_time_s,
            save_s = self.save_time_s,
            load_s = self.load_time_s,
            accepted = self.accepted_steps,
            rejected = self.rejected_steps,
            rhs_evals = self.rhs_evals,
            "run performance"
        );
        solver_timing::log_summary();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulating_timer_averages() {
        let acc = AccumulatingTimer::new();
        assert_eq!(acc.average_seconds(), 0.0);
        acc.record(0.5);
        acc.record(1.5);
        assert_eq!(acc.count(), 2);
        assert!((acc.total_seconds() - 2.0).abs() < 1e-6);
        assert!((acc.average_seconds() - 1.0).abs() < 1e-6);
        acc.reset();
        assert_eq!(acc.count(), 0);
    }
}
