//! Sequential benchmark runner.

use std::future::Future;
use std::io::Write;

use super::metrics::BenchmarkAccumulator;
use crate::error::Result;
use crate::http_client::LlamaClient;
use crate::models::GenerationResult;

/// Anything that can turn a prompt into a timed generation result
pub trait Generator {
    fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> impl Future<Output = Result<GenerationResult>>;
}

impl Generator for LlamaClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<GenerationResult> {
        LlamaClient::generate(self, prompt, max_tokens).await
    }
}

/// Routes benchmark prompts through the chat completions endpoint
pub struct ChatGenerator<'a>(pub &'a LlamaClient);

impl Generator for ChatGenerator<'_> {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<GenerationResult> {
        self.0.chat(prompt, max_tokens).await
    }
}

/// Benchmark runner that issues one request at a time
pub struct BenchmarkRunner<'a, G> {
    generator: &'a G,
    max_tokens: u32,
    quiet: bool,
}

impl<'a, G: Generator> BenchmarkRunner<'a, G> {
    pub fn new(generator: &'a G, max_tokens: u32) -> Self {
        Self {
            generator,
            max_tokens,
            quiet: false,
        }
    }

    /// Suppress the console progress line
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Run `iterations` passes over `prompts`, in order. A failed call is
    /// counted and the sweep moves on.
    pub async fn run<S: AsRef<str>>(&self, prompts: &[S], iterations: usize) -> BenchmarkAccumulator {
        let mut acc = BenchmarkAccumulator::new();
        let total = prompts.len() * iterations;
        let mut current = 0;

        for iteration in 0..iterations {
            for prompt in prompts {
                current += 1;
                self.progress(current, total);

                match self.generator.generate(prompt.as_ref(), self.max_tokens).await {
                    Ok(result) => {
                        tracing::debug!(
                            iteration,
                            latency_ms = result.latency.as_millis() as u64,
                            "Benchmark request succeeded"
                        );
                        acc.record_success(result.latency, result.timings.as_ref());
                    }
                    Err(e) => {
                        if !self.quiet {
                            println!();
                        }
                        tracing::warn!(iteration, test = current, error = %e, "Test failed");
                        acc.record_failure();
                    }
                }
            }
        }

        if !self.quiet && total > 0 {
            println!();
        }

        acc
    }

    fn progress(&self, current: usize, total: usize) {
        if self.quiet {
            return;
        }
        print!("\rRunning test {}/{}...", current, total);
        let _ = std::io::stdout().flush();
    }
}
