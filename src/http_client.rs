use anyhow::{Context, Result as AnyResult};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::{Duration, Instant};

use crate::error::{error_kind, ClientError, Result};
use crate::models::{
    ChatCompletionRequest, ChatCompletionResponse, CompletionRequest, CompletionResponse,
    GenerationResult,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:80";
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client for a llama.cpp server. No retries: every call either
/// resolves, fails, or times out exactly once.
pub struct LlamaClient {
    /// Reused across calls
    client: Client,

    /// Base URL without trailing slash
    base_url: String,

    /// Timeout for the health probe
    health_timeout: Duration,

    /// Timeout for chat and completion calls
    request_timeout: Duration,
}

impl LlamaClient {
    /// Create a client with the default 5s health / 30s request timeouts
    pub fn new(base_url: impl Into<String>) -> AnyResult<Self> {
        Self::with_timeouts(
            base_url,
            Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        health_timeout: Duration,
        request_timeout: Duration,
    ) -> AnyResult<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            health_timeout,
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe `/health`. Only an explicit 200 counts as healthy; every
    /// failure is logged and reported as `false`.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.base_url);

        match self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status();
                if status != StatusCode::OK {
                    tracing::warn!(status = status.as_u16(), url = %url, "Health check returned non-OK status");
                }
                status == StatusCode::OK
            }
            Err(e) => {
                tracing::warn!(
                    error_kind = error_kind(&e),
                    error = %e,
                    url = %url,
                    "Health check failed"
                );
                false
            }
        }
    }

    /// Send a single-turn chat through the OpenAI-compatible endpoint
    pub async fn chat(&self, message: &str, max_tokens: u32) -> Result<GenerationResult> {
        let body = ChatCompletionRequest::new(message, max_tokens);
        let (response, latency): (ChatCompletionResponse, _) =
            self.post_json("/v1/chat/completions", &body).await?;

        Ok(GenerationResult {
            content: response.content().to_string(),
            timings: response.timings,
            latency,
        })
    }

    /// Raw completion against the native `/completion` endpoint
    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<GenerationResult> {
        let body = CompletionRequest::new(prompt, max_tokens);
        let (response, latency): (CompletionResponse, _) =
            self.post_json("/completion", &body).await?;

        Ok(GenerationResult {
            content: response.content,
            timings: response.timings,
            latency,
        })
    }

    /// POST a JSON body and decode the JSON reply. The returned latency
    /// covers sending the request and reading the full response body.
    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<(R, Duration)>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Sending HTTP request");

        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| log_transport(e, &url))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| log_transport(e, &url))?;
        let latency = start.elapsed();

        if !status.is_success() {
            let error_text = String::from_utf8_lossy(&bytes).into_owned();
            tracing::warn!(
                status = status.as_u16(),
                url = %url,
                response_body = %error_text,
                "HTTP request failed with error response"
            );
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        tracing::debug!(
            status = %status,
            latency_ms = latency.as_millis() as u64,
            "Received HTTP response"
        );

        let parsed = serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok((parsed, latency))
    }
}

fn log_transport(e: reqwest::Error, url: &str) -> ClientError {
    let err = ClientError::transport(e);
    tracing::warn!(error = %err, url = %url, "HTTP request error");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_health_check_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .with_status(200)
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await;

        let client = LlamaClient::new(server.url()).unwrap();
        assert!(client.health_check().await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_health_check_non_ok_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(503)
            .with_body(r#"{"status":"loading model"}"#)
            .create_async()
            .await;

        let client = LlamaClient::new(server.url()).unwrap();
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check_other_success_status_is_unhealthy() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(204)
            .create_async()
            .await;

        let client = LlamaClient::new(server.url()).unwrap();
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        // Nothing listens on port 1
        let client = LlamaClient::new("http://127.0.0.1:1").unwrap();
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_generate_parses_content_and_timings() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/completion")
            .match_body(Matcher::PartialJson(json!({
                "prompt": "Hello, how are you?",
                "n_predict": 50,
                "stream": false,
                "top_k": 40
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "content": "I'm fine.",
                    "timings": {"predicted_n": 20, "predicted_ms": 400.0}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = LlamaClient::new(server.url()).unwrap();
        let result = client.generate("Hello, how are you?", 50).await.unwrap();

        assert_eq!(result.content, "I'm fine.");
        assert!((result.tokens_per_second().unwrap() - 50.0).abs() < 1e-9);
        assert!(result.latency > Duration::ZERO);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_error_status_propagates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/completion")
            .with_status(500)
            .with_body("model crashed")
            .create_async()
            .await;

        let client = LlamaClient::new(server.url()).unwrap();
        let err = client.generate("x", 10).await.unwrap_err();

        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model crashed");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/completion")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = LlamaClient::new(server.url()).unwrap();
        let err = client.generate("x", 10).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_generate_unreachable_is_transport_error() {
        let client = LlamaClient::new("http://127.0.0.1:1").unwrap();
        let err = client.generate("x", 10).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_chat_builds_messages_and_reads_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "max_tokens": 100,
                "messages": [
                    {"role": "system", "content": "You are a helpful assistant."},
                    {"role": "user", "content": "Write a haiku about autumn."}
                ]
            })))
            .with_status(200)
            .with_body(
                json!({
                    "id": "chatcmpl-1",
                    "object": "chat.completion",
                    "created": 0,
                    "model": "llama",
                    "choices": [{
                        "index": 0,
                        "message": {"role": "assistant", "content": "Leaves drift down"},
                        "finish_reason": "stop"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = LlamaClient::new(server.url()).unwrap();
        let result = client.chat("Write a haiku about autumn.", 100).await.unwrap();

        assert_eq!(result.content, "Leaves drift down");
        assert!(result.timings.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_error_status_propagates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(404)
            .create_async()
            .await;

        let client = LlamaClient::new(server.url()).unwrap();
        let err = client.chat("hi", 10).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 404, .. }));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = LlamaClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
