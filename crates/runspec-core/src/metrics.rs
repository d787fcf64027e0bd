//! Process-wide compilation counters.
//!
//! The compiler records one outcome per `compile` call. The CLI emits a
//! single summary event through [`Metrics::flush`] before exiting.

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    compilations: AtomicU64,
    run_specs_emitted: AtomicU64,
    compile_failures: AtomicU64,
}

/// Counter values read at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub compilations: u64,
    pub run_specs_emitted: u64,
    pub compile_failures: u64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            compilations: AtomicU64::new(0),
            run_specs_emitted: AtomicU64::new(0),
            compile_failures: AtomicU64::new(0),
        }
    }

    /// A compilation that produced `run_specs` run specs.
    pub fn record_success(&self, run_specs: usize) {
        self.compilations.fetch_add(1, Ordering::Relaxed);
        self.run_specs_emitted
            .fetch_add(run_specs as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.compilations.fetch_add(1, Ordering::Relaxed);
        self.compile_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            compilations: self.compilations.load(Ordering::Relaxed),
            run_specs_emitted: self.run_specs_emitted.load(Ordering::Relaxed),
            compile_failures: self.compile_failures.load(Ordering::Relaxed),
        }
    }

    /// Emit the current counters as one `info!` event.
    pub fn flush(&self) {
        let snapshot = self.snapshot();
        tracing::info!(
            metric = "flush",
            compilations = snapshot.compilations,
            run_specs_emitted = snapshot.run_specs_emitted,
            compile_failures = snapshot.compile_failures,
        );
    }
}
