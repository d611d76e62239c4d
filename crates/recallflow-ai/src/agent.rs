//! Memory-aware chat wrapper.
//!
//! Before each turn the agent reads every memory block and prefixes the
//! user's message with what it knows; after the model replies, the user and
//! assistant turns are ingested into every block. Memory and LLM failures
//! come back as errors from [`MemoryAgent::chat`]; only
//! [`MemoryAgent::chat_or_fallback`] turns them into a canned reply.

use std::sync::Arc;

use recallflow_traits::{MemoryBlock, Role, SESSION_ID_KEY, TOOL_CALLS_KEY, Turn};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient, Message, ToolCall};

/// Reply returned when a chat turn fails at the wrapper boundary.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble processing your request. Please try again.";

/// Final answer of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub response: String,
}

/// Single-turn chat agent backed by memory blocks.
pub struct MemoryAgent {
    llm: Arc<dyn LlmClient>,
    blocks: Vec<Box<dyn MemoryBlock>>,
    session_id: String,
    system_prompt: Option<String>,
}

impl MemoryAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            blocks: Vec::new(),
            session_id: Uuid::new_v4().to_string(),
            system_prompt: None,
        }
    }

    /// Attach a memory block. Blocks are read and updated in attach order.
    pub fn with_block(mut self, block: impl MemoryBlock + 'static) -> Self {
        self.blocks.push(Box::new(block));
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn blocks(&self) -> &[Box<dyn MemoryBlock>] {
        &self.blocks
    }

    /// Non-empty block contents, newline-joined in attach order.
    pub fn memory_context(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.retrieve())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Run one chat turn and update memory with it.
    pub async fn chat(&mut self, user_msg: &str) -> Result<AgentReply> {
        let mut messages = Vec::new();
        if let Some(prompt) = &self.system_prompt {
            messages.push(Message::system(prompt.clone()));
        }

        let context = self.memory_context();
        let prompt = if context.is_empty() {
            user_msg.to_string()
        } else {
            format!(
                "Known context from conversation so far:\n{context}\n\
                 When answering, reference the known context above if relevant.\n{user_msg}"
            )
        };
        messages.push(Message::user(prompt));

        let response = self.llm.complete(CompletionRequest::new(messages)).await?;
        let content = response.content.unwrap_or_default();

        let session = json!(self.session_id);
        let user_turn = Turn::user(user_msg).with_annotation(SESSION_ID_KEY, session.clone());
        let mut assistant_turn =
            Turn::new(Role::Assistant).with_annotation(SESSION_ID_KEY, session);
        if !content.is_empty() {
            assistant_turn = assistant_turn.with_text(content.clone());
        }
        if !response.tool_calls.is_empty() {
            assistant_turn = assistant_turn
                .with_annotation(TOOL_CALLS_KEY, raw_tool_calls(&response.tool_calls));
        }

        let turns = [user_turn, assistant_turn];
        for block in &mut self.blocks {
            block.ingest(&turns).await?;
        }

        Ok(AgentReply { response: content })
    }

    /// Like [`chat`](Self::chat), but logs failures and answers with
    /// [`FALLBACK_REPLY`].
    pub async fn chat_or_fallback(&mut self, user_msg: &str) -> AgentReply {
        match self.chat(user_msg).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(
                    session_id = %self.session_id,
                    error = %err,
                    "Chat turn failed, returning fallback reply"
                );
                AgentReply {
                    response: FALLBACK_REPLY.to_string(),
                }
            }
        }
    }
}

/// Tool calls in the chat-completions wire shape.
fn raw_tool_calls(calls: &[ToolCall]) -> Value {
    Value::Array(
        calls
            .iter()
            .map(|call| {
                json!({
                    "id": call.id,
                    "type": "function",
                    "function": {"name": call.name, "arguments": call.arguments},
                })
            })
            .collect(),
    )
}
