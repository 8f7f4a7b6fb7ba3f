// Orchestration of a full benchmark session:
// health check -> smoke test -> sweep -> report -> persisted results

use std::path::PathBuf;
use std::time::Duration;

use crate::bench::{
    output, BenchmarkAccumulator, BenchmarkConfig, BenchmarkRunner, ChatGenerator, Endpoint,
    SummaryReport,
};
use crate::error::RunError;
use crate::http_client::LlamaClient;

/// Everything a successful session produced
#[derive(Debug)]
pub struct RunOutcome {
    pub accumulator: BenchmarkAccumulator,
    pub report: SummaryReport,
    pub results_path: PathBuf,
}

/// Run one benchmark session. Health and smoke-test failures abort before
/// the sweep; failures inside the sweep are only counted.
pub async fn run(config: &BenchmarkConfig) -> Result<RunOutcome, RunError> {
    let client = LlamaClient::with_timeouts(
        &config.base_url,
        Duration::from_secs(config.health_timeout_secs),
        Duration::from_secs(config.request_timeout_secs),
    )
    .map_err(RunError::Setup)?;

    println!("\n1. Health Check...");
    if !client.health_check().await {
        tracing::error!(base_url = %client.base_url(), "Server is not healthy");
        return Err(RunError::Unhealthy {
            base_url: client.base_url().to_string(),
        });
    }
    println!("Server is healthy");

    println!("\n2. Single Generation Test...");
    let smoke = client
        .generate(&config.smoke_prompt, config.smoke_max_tokens)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Smoke test generation failed");
            RunError::SmokeTest(e)
        })?;
    println!("Generation successful");
    println!("   Latency: {:.3}s", smoke.latency_secs());
    println!("   Response: {}...", preview(&smoke.content, 100));

    println!("\n3. Running Benchmark...");
    println!(
        "{} prompts x {} iterations against {} ({} requests)",
        config.prompts.len(),
        config.iterations,
        config.endpoint.path(),
        config.total_requests()
    );

    let accumulator = match config.endpoint {
        Endpoint::Completion => {
            BenchmarkRunner::new(&client, config.max_tokens)
                .quiet(config.quiet)
                .run(&config.prompts, config.iterations)
                .await
        }
        Endpoint::Chat => {
            let chat = ChatGenerator(&client);
            BenchmarkRunner::new(&chat, config.max_tokens)
                .quiet(config.quiet)
                .run(&config.prompts, config.iterations)
                .await
        }
    };
    tracing::info!(
        successes = accumulator.successes,
        failures = accumulator.failures,
        "Benchmark finished"
    );

    let report = SummaryReport::from_accumulator(&accumulator);
    if config.json_output {
        println!("{}", report.to_json());
    } else {
        report.print_table();
    }

    let results_path = output::save_results(&accumulator, &config.output_dir, &chrono::Local::now())
        .map_err(RunError::Persist)?;
    println!("\nResults saved to {}", results_path.display());

    Ok(RunOutcome {
        accumulator,
        report,
        results_path,
    })
}

/// First `max_chars` characters of `text`
fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
