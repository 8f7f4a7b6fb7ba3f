//! Mock llama.cpp server for standalone runs and integration tests.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rand::Rng;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::config::{Endpoint, MockServerConfig};
use crate::models::llama::{
    ChatCompletionChoice, ChatCompletionRequest, ChatCompletionResponse, ChatCompletionUsage,
    ChatMessage, CompletionRequest, CompletionResponse, Timings,
};

struct MockState {
    config: MockServerConfig,
    generation_requests: AtomicU64,
}

/// Mock llama server bound to a local port
pub struct MockLlamaServer {
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    port: u16,
}

impl MockLlamaServer {
    /// Create a new mock server with the given configuration
    pub fn new(config: MockServerConfig) -> Self {
        Self {
            state: Arc::new(MockState {
                config,
                generation_requests: AtomicU64::new(0),
            }),
            shutdown_tx: None,
            port: 0,
        }
    }

    /// Start the mock server and return the actual port
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("127.0.0.1:{}", self.state.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();
        self.port = port;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let app = Router::new()
            .route("/health", get(handle_health))
            .route(Endpoint::Completion.path(), post(handle_completion))
            .route(Endpoint::Chat.path(), post(handle_chat))
            .with_state(self.state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        tracing::debug!(port, "Mock llama server started");
        Ok(port)
    }

    /// Get the server's URL
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Generation requests received so far, failed ones included
    pub fn generation_requests(&self) -> u64 {
        self.state.generation_requests.load(Ordering::Relaxed)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockLlamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_health(State(state): State<Arc<MockState>>) -> Response {
    if state.config.health_latency_ms > 0 {
        tokio::time::sleep(tokio::time::Duration::from_millis(state.config.health_latency_ms)).await;
    }

    if state.config.healthy {
        (StatusCode::OK, Json(json!({"status": "ok"}))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": {"code": 503, "message": "Loading model"}})),
        )
            .into_response()
    }
}

async fn handle_completion(
    State(state): State<Arc<MockState>>,
    Json(request): Json<CompletionRequest>,
) -> Response {
    if let Err(response) = simulate_generation(&state).await {
        return response;
    }

    Json(CompletionResponse {
        content: generate_content(request.n_predict),
        timings: timings(&state.config),
    })
    .into_response()
}

async fn handle_chat(
    State(state): State<Arc<MockState>>,
    Json(request): Json<ChatCompletionRequest>,
) -> Response {
    if let Err(response) = simulate_generation(&state).await {
        return response;
    }

    let prompt_tokens: u64 = request
        .messages
        .iter()
        .map(|m| m.content.split_whitespace().count() as u64)
        .sum();
    let completion_tokens = state.config.predicted_n;

    Json(ChatCompletionResponse {
        id: format!("chatcmpl-{}", uuid::Uuid::new_v4()),
        object: "chat.completion".to_string(),
        created: chrono::Utc::now().timestamp(),
        model: "mock-llama".to_string(),
        choices: vec![ChatCompletionChoice {
            index: 0,
            message: ChatMessage {
                role: "assistant".to_string(),
                content: generate_content(request.max_tokens),
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage: Some(ChatCompletionUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }),
        timings: timings(&state.config),
    })
    .into_response()
}

/// Count the request, sleep for the configured latency and roll for a
/// simulated failure
async fn simulate_generation(state: &MockState) -> Result<(), Response> {
    state.generation_requests.fetch_add(1, Ordering::Relaxed);

    if state.config.latency_ms > 0 {
        tokio::time::sleep(tokio::time::Duration::from_millis(state.config.latency_ms)).await;
    }

    if state.config.error_rate > 0.0 {
        let mut rng = rand::thread_rng();
        if rng.gen::<f64>() < state.config.error_rate {
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Simulated error").into_response());
        }
    }

    Ok(())
}

fn timings(config: &MockServerConfig) -> Option<Timings> {
    config.predicted_ms.map(|predicted_ms| Timings {
        predicted_n: config.predicted_n,
        predicted_ms,
    })
}

/// Generate filler text, roughly one word per requested token
fn generate_content(max_tokens: u32) -> String {
    const WORDS: &[&str] = &[
        "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "hello", "world",
        "llama", "token", "prompt", "benchmark", "latency", "server",
    ];

    let mut rng = rand::thread_rng();
    let count = max_tokens.clamp(1, 64) as usize;

    (0..count)
        .map(|_| WORDS[rng.gen_range(0..WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}
