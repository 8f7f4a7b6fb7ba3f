// llama-bench - Library root for testing

pub mod app;
pub mod bench;
pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
