//! SAMARTH Core - Domain models, metadata catalog, retry policy and configuration
//!
//! This crate contains the core domain logic shared by the fetchers, the LLM
//! adapters and the question-answering pipeline. It performs no network I/O.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod retry;

pub use error::{Result, SamarthError};
