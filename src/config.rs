use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::bench::config::DEFAULT_PROMPTS;
use crate::bench::{BenchmarkConfig, Endpoint, MockServerConfig};
use crate::http_client::{DEFAULT_BASE_URL, DEFAULT_HEALTH_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Benchmark client for llama.cpp-compatible servers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Server base URL
    #[arg(short = 'u', long, env = "LLAMA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Passes over the prompt set
    #[arg(short = 'n', long, env = "BENCH_ITERATIONS", default_value = "3")]
    pub iterations: usize,

    /// Max tokens per benchmark request
    #[arg(short = 'm', long, env = "BENCH_MAX_TOKENS", default_value = "100")]
    pub max_tokens: u32,

    /// Endpoint to benchmark (completion, chat)
    #[arg(short = 'e', long, env = "BENCH_ENDPOINT", default_value = "completion")]
    pub endpoint: Endpoint,

    /// File with one prompt per line (replaces the built-in prompts)
    #[arg(short = 'p', long, env = "BENCH_PROMPTS_FILE")]
    pub prompts_file: Option<String>,

    /// Directory for the results file
    #[arg(short = 'o', long, env = "BENCH_OUTPUT_DIR", default_value = ".")]
    pub output_dir: String,

    /// Generation request timeout in seconds
    #[arg(long, env = "BENCH_REQUEST_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout: u64,

    /// Health check timeout in seconds
    #[arg(long, env = "BENCH_HEALTH_TIMEOUT", default_value_t = DEFAULT_HEALTH_TIMEOUT_SECS)]
    pub health_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide the progress line
    #[arg(short, long)]
    pub quiet: bool,

    /// Start an in-process mock server and benchmark it instead of --base-url
    #[arg(long)]
    pub standalone: bool,

    /// Mock server latency per generation in milliseconds (standalone only)
    #[arg(long, default_value = "50")]
    pub mock_latency_ms: u64,

    /// Mock server error rate, 0.0 to 1.0 (standalone only)
    #[arg(long, default_value = "0.0")]
    pub mock_error_rate: f64,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bench: BenchmarkConfig,
    pub log_level: String,

    /// Set when running against the in-process mock server
    pub mock: Option<MockServerConfig>,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_args(parse_args(std::env::args_os())?)
    }

    pub fn from_args(args: CliArgs) -> Result<Self> {
        let prompts = match &args.prompts_file {
            Some(path) => load_prompts(&expand_tilde(path))?,
            None => DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect(),
        };

        let mock = args.standalone.then(|| MockServerConfig {
            latency_ms: args.mock_latency_ms,
            error_rate: args.mock_error_rate,
            ..Default::default()
        });

        let bench = BenchmarkConfig {
            base_url: normalize_base_url(&args.base_url),
            endpoint: args.endpoint,
            iterations: args.iterations,
            max_tokens: args.max_tokens,
            prompts,
            health_timeout_secs: args.health_timeout,
            request_timeout_secs: args.request_timeout,
            output_dir: expand_tilde(&args.output_dir),
            json_output: args.json,
            quiet: args.quiet,
            ..Default::default()
        };

        Ok(Config {
            bench,
            log_level: args.log_level,
            mock,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = &self.bench.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("Base URL must start with http:// or https://: {}", url);
        }

        if self.bench.prompts.is_empty() {
            anyhow::bail!("Prompt set is empty");
        }

        if self.bench.iterations == 0 {
            anyhow::bail!("Iterations must be at least 1");
        }

        if self.bench.request_timeout_secs == 0 || self.bench.health_timeout_secs == 0 {
            anyhow::bail!("Timeouts must be at least one second");
        }

        if let Some(mock) = &self.mock {
            if !(0.0..=1.0).contains(&mock.error_rate) {
                anyhow::bail!("Mock error rate must be between 0.0 and 1.0");
            }
        }

        Ok(())
    }
}

/// Parse command-line arguments without letting clap pick the exit status.
///
/// `--help` and `--version` print and exit 0; any other clap error is
/// returned so the caller reports it as a configuration failure.
pub fn parse_args<I, T>(argv: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match CliArgs::try_parse_from(argv) {
        Ok(args) => Ok(args),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => Err(anyhow::Error::new(e).context("Invalid command-line arguments")),
    }
}

/// Read prompts from a file, one per non-empty line
pub fn load_prompts(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read prompts file {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Strip trailing slashes so paths can be appended directly
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
