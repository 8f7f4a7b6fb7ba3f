use std::process::ExitCode;

use llama_bench::bench::MockLlamaServer;
use llama_bench::error::RunError;
use llama_bench::{app, config};

#[tokio::main]
async fn main() -> ExitCode {
    let mut config = match config::Config::load().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    println!("llama-bench {}", env!("CARGO_PKG_VERSION"));
    println!("{}", "=".repeat(50));

    // Keep the mock server alive for the whole session
    let mut _mock_server = None;
    if let Some(mock_config) = config.mock.clone() {
        let mut server = MockLlamaServer::new(mock_config);
        match server.start().await {
            Ok(port) => {
                tracing::info!(port, "Mock llama server started");
                config.bench.base_url = server.url();
                _mock_server = Some(server);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to start mock server");
                return ExitCode::FAILURE;
            }
        }
    }

    tracing::info!(
        base_url = %config.bench.base_url,
        endpoint = %config.bench.endpoint,
        iterations = config.bench.iterations,
        prompts = config.bench.prompts.len(),
        "Starting benchmark session"
    );

    match app::run(&config.bench).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match &e {
                RunError::Unhealthy { .. } => {
                    eprintln!("Server is not healthy. Please check deployment.")
                }
                RunError::SmokeTest(err) => {
                    eprintln!("Generation failed: {}", err)
                }
                other => eprintln!("{}", other),
            }
            ExitCode::from(e.exit_code())
        }
    }
}
