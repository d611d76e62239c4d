//! RecallFlow AI - bounded conversational memory for LLM agents
//!
//! This crate provides:
//! - Condensed memory (summarized turns under a token budget)
//! - Proposition memory (LLM-extracted facts with dedup and condensation)
//! - LLM-backed summarizer and proposition extractor adapters
//! - OpenAI chat-completions client with retry, plus a scripted mock
//! - A memory-aware chat wrapper
//! - TOML configuration

#![allow(dead_code)]

pub mod agent;
pub mod config;
pub mod error;
mod http_client;
pub mod llm;
pub mod memory;

// Re-export commonly used types
pub use agent::{AgentReply, FALLBACK_REPLY, MemoryAgent};
pub use config::{CondensedConfig, LlmConfig, MemoryConfig, PropositionConfig};
pub use error::{AiError, Result};
pub use llm::{
    CompletionRequest, CompletionResponse, LlmClient, LlmRetryConfig, Message, MockLlmClient,
    MockStep, OpenAIClient, Role,
};
pub use memory::{
    CondensedBlock, LlmPropositionExtractor, LlmSummarizer, PropositionBlock, TiktokenCounter,
};
pub use recallflow_traits::{
    ContentSegment, MemoryBlock, MemoryError, PropositionExtractor, Summarizer, TokenCounter, Turn,
};
