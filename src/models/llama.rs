use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sampling defaults used for every benchmark request
pub const TEMPERATURE: f64 = 0.7;
pub const TOP_P: f64 = 0.9;
pub const TOP_K: u32 = 40;
pub const REPEAT_PENALTY: f64 = 1.1;

/// Stop sequences covering ChatML, Llama and GPT style end markers
pub const STOP_SEQUENCES: [&str; 3] = ["<|im_end|>", "</s>", "<|endoftext|>"];

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

// ==================================================================================================
// Models for /completion endpoint
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub n_predict: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub repeat_penalty: f64,
    pub stream: bool,
    pub stop: Vec<String>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            n_predict: max_tokens,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            top_k: TOP_K,
            repeat_penalty: REPEAT_PENALTY,
            stream: false,
            stop: STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Server-side generation timings reported by llama.cpp
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default)]
    pub predicted_n: u64,
    #[serde(default)]
    pub predicted_ms: f64,
}

impl Timings {
    /// Generated tokens per second, or `None` when no generation time was
    /// reported or the rate is not a finite number
    pub fn tokens_per_second(&self) -> Option<f64> {
        if self.predicted_ms <= 0.0 {
            return None;
        }
        let tps = self.predicted_n as f64 / (self.predicted_ms / 1000.0);
        tps.is_finite().then_some(tps)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timings: Option<Timings>,
}

// ==================================================================================================
// Models for /v1/chat/completions endpoint
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl ChatCompletionRequest {
    pub fn new(message: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(message)],
            max_tokens,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChatCompletionUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChatCompletionUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timings: Option<Timings>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, empty if the server returned none
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default()
    }
}

// ==================================================================================================
// Client-side result
// ==================================================================================================

/// Outcome of one generation call, annotated with the observed round trip
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub content: String,
    pub timings: Option<Timings>,
    pub latency: Duration,
}

impl GenerationResult {
    pub fn latency_secs(&self) -> f64 {
        self.latency.as_secs_f64()
    }

    pub fn tokens_per_second(&self) -> Option<f64> {
        self.timings.as_ref().and_then(Timings::tokens_per_second)
    }
}
