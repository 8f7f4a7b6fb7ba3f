//! Report generation for benchmark results.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::metrics::BenchmarkAccumulator;
use super::stats;

const RULE_WIDTH: usize = 50;

/// Latency summary in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
}

/// Throughput summary in tokens per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroughputStats {
    pub mean: f64,
    pub median: f64,
}

/// Summary computed once from a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    /// Absent when no call succeeded
    pub latency: Option<LatencyStats>,
    /// Absent when no call reported timings
    pub throughput: Option<ThroughputStats>,
    pub successes: u64,
    pub failures: u64,
    /// Percentage, absent when nothing was attempted
    pub success_rate: Option<f64>,
}

impl SummaryReport {
    pub fn from_accumulator(acc: &BenchmarkAccumulator) -> Self {
        let latency = summarize_latency(&acc.latencies);

        let sorted_tps = stats::sorted(&acc.tokens_per_second);
        let throughput = match (stats::mean(&sorted_tps), stats::median_sorted(&sorted_tps)) {
            (Some(mean), Some(median)) => Some(ThroughputStats { mean, median }),
            _ => None,
        };

        Self {
            latency,
            throughput,
            successes: acc.successes,
            failures: acc.failures,
            success_rate: acc.success_rate(),
        }
    }

    /// Render the human-readable report
    pub fn render(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "BENCHMARK RESULTS");
        let _ = writeln!(out, "{}", rule);

        if let Some(l) = &self.latency {
            let _ = writeln!(out);
            let _ = writeln!(out, "Latency Statistics:");
            let _ = writeln!(out, "  Average: {:.3}s", l.mean);
            let _ = writeln!(out, "  Median:  {:.3}s", l.median);
            let _ = writeln!(out, "  P95:     {:.3}s", l.p95);
            let _ = writeln!(out, "  P99:     {:.3}s", l.p99);
            let _ = writeln!(out, "  Min:     {:.3}s", l.min);
            let _ = writeln!(out, "  Max:     {:.3}s", l.max);
        }

        if let Some(t) = &self.throughput {
            let _ = writeln!(out);
            let _ = writeln!(out, "Tokens Per Second:");
            let _ = writeln!(out, "  Average: {:.2}", t.mean);
            let _ = writeln!(out, "  Median:  {:.2}", t.median);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Test Summary:");
        let _ = writeln!(out, "  Successes: {}", self.successes);
        let _ = writeln!(out, "  Failures:  {}", self.failures);
        match self.success_rate {
            Some(rate) => {
                let _ = writeln!(out, "  Success Rate: {:.1}%", rate);
            }
            None => {
                let _ = writeln!(out, "  Success Rate: N/A (no tests run)");
            }
        }
        let _ = writeln!(out, "{}", rule);

        out
    }

    /// Print the report to stdout
    pub fn print_table(&self) {
        print!("{}", self.render());
    }

    /// Export the summary as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn summarize_latency(latencies: &[f64]) -> Option<LatencyStats> {
    let sorted = stats::sorted(latencies);
    let (first, last) = (sorted.first()?, sorted.last()?);

    Some(LatencyStats {
        mean: stats::mean(&sorted)?,
        median: stats::median_sorted(&sorted)?,
        p95: stats::percentile_sorted(&sorted, 0.95)?,
        p99: stats::percentile_sorted(&sorted, 0.99)?,
        min: *first,
        max: *last,
    })
}
