//! Configuration structs for benchmarking.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::http_client::{DEFAULT_BASE_URL, DEFAULT_HEALTH_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Prompts used when no prompts file is given
pub const DEFAULT_PROMPTS: [&str; 5] = [
    "What is the capital of France?",
    "Explain quantum computing in simple terms.",
    "Write a haiku about autumn.",
    "What are the benefits of exercise?",
    "Tell me about the solar system.",
];

pub const DEFAULT_SMOKE_PROMPT: &str = "Hello, how are you?";

/// Server endpoint the benchmark sweep targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Endpoint {
    /// Native `/completion`
    #[default]
    Completion,
    /// OpenAI-compatible `/v1/chat/completions`
    Chat,
}

impl Endpoint {
    /// URL path the endpoint is served under
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Completion => "/completion",
            Endpoint::Chat => "/v1/chat/completions",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Completion => write!(f, "completion"),
            Endpoint::Chat => write!(f, "chat"),
        }
    }
}

impl std::str::FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completion" => Ok(Endpoint::Completion),
            "chat" => Ok(Endpoint::Chat),
            _ => Err(format!("Unknown endpoint: {}", s)),
        }
    }
}

/// Configuration for a benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Server base URL
    pub base_url: String,
    /// Endpoint the sweep calls
    pub endpoint: Endpoint,
    /// Passes over the prompt set
    pub iterations: usize,
    /// Token budget for each sweep request
    pub max_tokens: u32,
    /// Prompts, in call order within an iteration
    pub prompts: Vec<String>,
    /// Prompt for the pre-benchmark smoke test
    pub smoke_prompt: String,
    /// Token budget for the smoke test
    pub smoke_max_tokens: u32,
    /// Health probe timeout in seconds
    pub health_timeout_secs: u64,
    /// Generation request timeout in seconds
    pub request_timeout_secs: u64,
    /// Directory receiving the results file
    pub output_dir: PathBuf,
    /// Print the summary as JSON instead of text
    pub json_output: bool,
    /// Hide the per-request progress line
    pub quiet: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: Endpoint::Completion,
            iterations: 3,
            max_tokens: 100,
            prompts: DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect(),
            smoke_prompt: DEFAULT_SMOKE_PROMPT.to_string(),
            smoke_max_tokens: 50,
            health_timeout_secs: DEFAULT_HEALTH_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            output_dir: PathBuf::from("."),
            json_output: false,
            quiet: false,
        }
    }
}

impl BenchmarkConfig {
    /// Total calls the sweep will issue
    pub fn total_requests(&self) -> usize {
        self.prompts.len() * self.iterations
    }
}

/// Configuration for the in-process mock llama server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockServerConfig {
    /// Port to listen on (0 for random)
    pub port: u16,
    /// Simulated generation latency in milliseconds
    pub latency_ms: u64,
    /// Tokens reported in `timings.predicted_n`
    pub predicted_n: u64,
    /// Generation time reported in `timings.predicted_ms`; `None` omits `timings`
    pub predicted_ms: Option<f64>,
    /// Fraction of generation requests answered with 500 (0.0 to 1.0)
    pub error_rate: f64,
    /// Whether `/health` answers 200
    pub healthy: bool,
    /// Delay before `/health` answers, in milliseconds
    pub health_latency_ms: u64,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            latency_ms: 10,
            predicted_n: 20,
            predicted_ms: Some(200.0),
            error_rate: 0.0,
            healthy: true,
            health_latency_ms: 0,
        }
    }
}
