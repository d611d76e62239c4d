//! LLM module - chat client abstraction used by the memory adapters

mod client;
mod mock_client;
mod openai;
mod retry;

pub use client::{
    CompletionRequest, CompletionResponse, FinishReason, LlmClient, Message, Role, TokenUsage,
    ToolCall,
};
pub use mock_client::{MockLlmClient, MockStep};
pub use openai::{DEFAULT_OPENAI_MODEL, OpenAIClient};
pub use retry::LlmRetryConfig;
