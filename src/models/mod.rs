// Data models for the llama server API

pub mod llama;

pub use llama::{
    ChatCompletionRequest, ChatCompletionResponse, CompletionRequest, CompletionResponse,
    GenerationResult, Timings,
};
