//! SAMARTH LLM - text generation port and adapters
//!
//! This crate defines the text generation port used by the query parser,
//! the answer generator and general chat, along with the Gemini and Ollama
//! adapters and the retry wrapper shared by all of them.

pub mod gemini;
pub mod json;
pub mod ollama;
pub mod ports;
pub mod provider;
pub mod resilient;

// Re-export main types
pub use gemini::GeminiGenerator;
pub use json::extract_json_block;
pub use ollama::OllamaGenerator;
pub use ports::{LlmError, LlmErrorKind, TextGenerator};
pub use provider::{create_generator, GeneratorSettings, ProviderSpec};
pub use resilient::ResilientGenerator;
