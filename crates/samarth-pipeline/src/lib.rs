//! SAMARTH Pipeline - question answering over the agriculture datasets
//!
//! This crate sequences one user turn: classify, parse, validate, plan,
//! fetch and answer.

pub mod answer;
pub mod classifier;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod planner;
pub mod validator;

pub use answer::{build_answer_prompt, build_data_digest, build_general_prompt};
pub use classifier::{classify_chat, is_agriculture_question, ChatKind};
pub use models::{KeyedFailure, PreparedTurn, TurnKind, TurnOutcome};
pub use parser::{build_parse_prompt, parse_llm_response, ParseFailure, ParseOutcome, QueryParser};
pub use pipeline::QaPipeline;
pub use planner::determine_required_apis;
pub use validator::{normalize_query, validate_parsed_query};
