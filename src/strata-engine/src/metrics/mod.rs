//! Metrics collection for plan execution.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Counters for one operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorMetrics {
    /// Rows pulled from inputs.
    pub rows_in: u64,
    /// Rows emitted.
    pub rows_out: u64,
    /// Batches emitted.
    pub batches: u64,
    /// Time spent inside `next`.
    pub exec_time: Duration,
}

impl OperatorMetrics {
    /// Create new metrics.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows_in: 0,
            rows_out: 0,
            batches: 0,
            exec_time: Duration::ZERO,
        }
    }

    /// Add rows processed.
    pub fn add_rows_in(&mut self, count: usize) {
        self.rows_in += count as u64;
    }

    /// Record an emitted batch of `rows` rows.
    pub fn add_output(&mut self, rows: usize) {
        self.rows_out += rows as u64;
        self.batches += 1;
    }

    /// Add execution time.
    pub fn add_time(&mut self, duration: Duration) {
        self.exec_time += duration;
    }

    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &Self) {
        self.rows_in += other.rows_in;
        self.rows_out += other.rows_out;
        self.batches += other.batches;
        self.exec_time += other.exec_time;
    }
}

impl std::fmt::Display for OperatorMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rows_in={}, rows_out={}, batches={}, time={:?}",
            self.rows_in, self.rows_out, self.batches, self.exec_time
        )
    }
}

/// Shared sink operators report into when they close.
///
/// Operators with the same label are merged.
#[derive(Debug, Clone, Default)]
pub struct MetricsSink {
    metrics: Arc<Mutex<BTreeMap<String, OperatorMetrics>>>,
}

impl MetricsSink {
    /// Create a new metrics sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Counters stay meaningful after a panicking writer, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, OperatorMetrics>> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merge `metrics` into the entry for `operator`.
    pub fn record(&self, operator: &str, metrics: &OperatorMetrics) {
        self.lock()
            .entry(operator.to_string())
            .or_default()
            .merge(metrics);
    }

    /// Get metrics for an operator.
    pub fn get(&self, operator: &str) -> Option<OperatorMetrics> {
        self.lock().get(operator).copied()
    }

    /// Snapshot of every entry.
    pub fn all(&self) -> BTreeMap<String, OperatorMetrics> {
        self.lock().clone()
    }

    /// Total rows emitted across all operators.
    pub fn total_rows_out(&self) -> u64 {
        self.lock().values().map(|m| m.rows_out).sum()
    }

    /// Format metrics for EXPLAIN ANALYZE.
    pub fn format_analyze(&self) -> String {
        let metrics = self.lock();
        if metrics.is_empty() {
            return "No metrics collected.\n".to_string();
        }
        let mut output = String::new();
        for (op, m) in metrics.iter() {
            let _ = writeln!(output, "{op}: {m}");
        }
        output
    }
}

/// Timer for measuring operator execution time.
#[derive(Debug)]
pub struct ExecutionTimer {
    start: Instant,
}

impl ExecutionTimer {
    /// Start a new timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since `start`.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
