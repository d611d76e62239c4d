//! Scripted LLM client for memory and agent tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AiError, Result};

use super::{CompletionRequest, CompletionResponse, FinishReason, LlmClient, Role, ToolCall};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockStep {
    Text(String),
    ToolCall(ToolCall),
    Error(String),
}

impl MockStep {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn tool_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::ToolCall(ToolCall {
            id: id.into(),
            name: name.into(),
            arguments,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    fn into_response(self) -> Result<CompletionResponse> {
        match self {
            Self::Text(content) => Ok(CompletionResponse {
                content: Some(content),
                tool_calls: Vec::new(),
                finish_reason: FinishReason::Stop,
                usage: None,
            }),
            Self::ToolCall(call) => Ok(CompletionResponse {
                content: None,
                tool_calls: vec![call],
                finish_reason: FinishReason::ToolCalls,
                usage: None,
            }),
            Self::Error(message) => Err(AiError::Llm(message)),
        }
    }
}

#[derive(Debug, Default)]
struct Transcript {
    script: VecDeque<MockStep>,
    requests: Vec<CompletionRequest>,
}

/// Replays scripted steps in order and records every request.
///
/// Once the script runs out, each call echoes the last user message as
/// `mock-echo: <text>`. Clones share the same script and transcript.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    model: String,
    transcript: Arc<Mutex<Transcript>>,
}

impl MockLlmClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self::from_steps(model, Vec::new())
    }

    pub fn from_steps(model: impl Into<String>, steps: Vec<MockStep>) -> Self {
        Self {
            model: model.into(),
            transcript: Arc::new(Mutex::new(Transcript {
                script: steps.into(),
                requests: Vec::new(),
            })),
        }
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.transcript.lock().await.requests.clone()
    }
}

fn echo(request: &CompletionRequest) -> MockStep {
    let last_user = request
        .messages
        .iter()
        .rev()
        .find(|message| message.role == Role::User);
    match last_user {
        Some(message) => MockStep::text(format!("mock-echo: {}", message.content)),
        None => MockStep::text("mock-ok"),
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let step = {
            let mut transcript = self.transcript.lock().await;
            let step = transcript
                .script
                .pop_front()
                .unwrap_or_else(|| echo(&request));
            transcript.requests.push(request);
            step
        };
        step.into_response()
    }
}
