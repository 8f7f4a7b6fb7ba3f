//! Benchmark module for llama server performance testing.
//!
//! This module provides:
//! - Sequential benchmark runner over a prompt set
//! - Latency/throughput sample collection and order statistics
//! - Report generation and timestamped result files
//! - Mock llama server for standalone runs

pub mod config;
pub mod metrics;
pub mod mock_server;
pub mod output;
pub mod report;
pub mod runner;
pub mod stats;

pub use config::{BenchmarkConfig, Endpoint, MockServerConfig};
pub use metrics::BenchmarkAccumulator;
pub use mock_server::MockLlamaServer;
pub use report::SummaryReport;
pub use runner::{BenchmarkRunner, ChatGenerator, Generator};
