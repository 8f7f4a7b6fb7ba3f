//! Raw sample collection for a benchmark run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::Timings;

/// Samples and counters gathered during one benchmark run.
///
/// Owned by the runner while the sweep executes, then handed to the report
/// and persisted as-is. Field names are the on-disk format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkAccumulator {
    /// Round-trip latency of each successful call, in seconds, completion order
    pub latencies: Vec<f64>,
    /// Tokens per second for successful calls that reported generation timings
    pub tokens_per_second: Vec<f64>,
    pub successes: u64,
    pub failures: u64,
}

impl BenchmarkAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful call. Throughput is only sampled when the server
    /// reported a positive generation time.
    pub fn record_success(&mut self, latency: Duration, timings: Option<&Timings>) {
        self.latencies.push(latency.as_secs_f64());

        if let Some(tps) = timings.and_then(Timings::tokens_per_second) {
            self.tokens_per_second.push(tps);
        }

        self.successes += 1;
    }

    /// Record a failed call
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Total number of calls attempted
    pub fn total_requests(&self) -> u64 {
        self.successes + self.failures
    }

    /// Success rate as a percentage, `None` when nothing was attempted
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.total_requests();
        if total == 0 {
            return None;
        }
        Some(self.successes as f64 / total as f64 * 100.0)
    }
}
