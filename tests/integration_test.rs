// Integration tests for llama-bench
//
// These tests drive the full session (health check, smoke test, sweep,
// report, persisted results) against the in-process mock llama server.

use std::path::{Path, PathBuf};

use llama_bench::{
    app,
    bench::{output, BenchmarkConfig, Endpoint, MockLlamaServer, MockServerConfig},
    error::RunError,
    http_client::LlamaClient,
};

// ==================================================================================================
// Test Helpers
// ==================================================================================================

async fn start_mock(config: MockServerConfig) -> MockLlamaServer {
    let mut server = MockLlamaServer::new(config);
    server.start().await.expect("Failed to start mock server");
    server
}

fn output_dir() -> PathBuf {
    std::env::temp_dir().join(format!("llama-bench-it-{}", uuid::Uuid::new_v4()))
}

fn bench_config(server: &MockLlamaServer, dir: &Path) -> BenchmarkConfig {
    BenchmarkConfig {
        base_url: server.url(),
        output_dir: dir.to_path_buf(),
        quiet: true,
        ..Default::default()
    }
}

// ==================================================================================================
// Full Session Tests
// ==================================================================================================

#[tokio::test]
async fn test_full_session_writes_results() {
    let server = start_mock(MockServerConfig {
        latency_ms: 2,
        ..Default::default()
    })
    .await;
    let dir = output_dir();
    let config = bench_config(&server, &dir);

    let outcome = app::run(&config).await.expect("session should succeed");

    // 5 prompts x 3 iterations, plus the smoke test
    assert_eq!(outcome.accumulator.successes, 15);
    assert_eq!(outcome.accumulator.failures, 0);
    assert_eq!(server.generation_requests(), 16);

    // Mock reports 20 tokens in 200ms
    let throughput = outcome.report.throughput.expect("throughput stats");
    assert!((throughput.mean - 100.0).abs() < 1e-9);
    assert_eq!(outcome.report.success_rate, Some(100.0));

    let latency = outcome.report.latency.expect("latency stats");
    assert!(latency.min >= 0.002);
    assert!(latency.min <= latency.median && latency.median <= latency.max);

    let file_name = outcome.results_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("benchmark_results_"));
    assert!(file_name.ends_with(".json"));

    let reloaded = output::load_results(&outcome.results_path).unwrap();
    assert_eq!(reloaded, outcome.accumulator);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_chat_endpoint_session() {
    let server = start_mock(MockServerConfig {
        latency_ms: 1,
        predicted_ms: None,
        ..Default::default()
    })
    .await;
    let dir = output_dir();
    let config = BenchmarkConfig {
        endpoint: Endpoint::Chat,
        iterations: 1,
        ..bench_config(&server, &dir)
    };

    let outcome = app::run(&config).await.unwrap();

    assert_eq!(outcome.accumulator.successes, 5);
    // No timings reported: latencies only
    assert!(outcome.accumulator.tokens_per_second.is_empty());
    assert!(outcome.report.throughput.is_none());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_unhealthy_server_aborts_before_generation() {
    let server = start_mock(MockServerConfig {
        healthy: false,
        ..Default::default()
    })
    .await;
    let dir = output_dir();

    let err = app::run(&bench_config(&server, &dir)).await.unwrap_err();

    assert!(matches!(err, RunError::Unhealthy { .. }));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(server.generation_requests(), 0);
    assert!(!dir.exists());
}

#[tokio::test]
async fn test_unreachable_server_is_unhealthy() {
    let dir = output_dir();
    let config = BenchmarkConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        health_timeout_secs: 1,
        output_dir: dir.clone(),
        quiet: true,
        ..Default::default()
    };

    let err = app::run(&config).await.unwrap_err();
    assert!(matches!(err, RunError::Unhealthy { .. }));
}

#[tokio::test]
async fn test_failing_smoke_test_aborts() {
    let server = start_mock(MockServerConfig {
        latency_ms: 0,
        error_rate: 1.0,
        ..Default::default()
    })
    .await;
    let dir = output_dir();

    let err = app::run(&bench_config(&server, &dir)).await.unwrap_err();

    assert!(matches!(err, RunError::SmokeTest(_)));
    assert_eq!(err.exit_code(), 3);
    // Only the smoke test reached the server
    assert_eq!(server.generation_requests(), 1);
    assert!(!dir.exists());
}

// ==================================================================================================
// Client Tests
// ==================================================================================================

#[tokio::test]
async fn test_timeout_is_a_terminal_failure() {
    let server = start_mock(MockServerConfig {
        latency_ms: 1500,
        ..Default::default()
    })
    .await;

    let client = LlamaClient::with_timeouts(
        server.url(),
        std::time::Duration::from_secs(5),
        std::time::Duration::from_millis(200),
    )
    .unwrap();

    assert!(client.health_check().await);
    let err = client.generate("slow", 10).await.unwrap_err();
    assert!(err.to_string().contains("timeout"));
    // No retry was attempted
    assert_eq!(server.generation_requests(), 1);
}

#[tokio::test]
async fn test_slow_health_endpoint_times_out_as_unhealthy() {
    let server = start_mock(MockServerConfig {
        health_latency_ms: 1000,
        ..Default::default()
    })
    .await;

    let client = LlamaClient::with_timeouts(
        server.url(),
        std::time::Duration::from_millis(100),
        std::time::Duration::from_secs(5),
    )
    .unwrap();

    let started = std::time::Instant::now();
    assert!(!client.health_check().await);
    assert!(started.elapsed() < std::time::Duration::from_millis(900));
    assert_eq!(server.generation_requests(), 0);
}

#[tokio::test]
async fn test_sweep_counts_timeouts_as_failures() {
    use llama_bench::bench::BenchmarkRunner;

    let server = start_mock(MockServerConfig {
        latency_ms: 1500,
        ..Default::default()
    })
    .await;
    let client = LlamaClient::with_timeouts(
        server.url(),
        std::time::Duration::from_secs(5),
        std::time::Duration::from_millis(100),
    )
    .unwrap();

    let acc = BenchmarkRunner::new(&client, 10)
        .quiet(true)
        .run(&["a", "b"], 1)
        .await;

    assert_eq!(acc.failures, 2);
    assert_eq!(acc.successes, 0);
    assert!(acc.latencies.is_empty());
}
