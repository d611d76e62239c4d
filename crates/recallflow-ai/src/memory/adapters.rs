//! LLM-backed implementations of the memory collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use recallflow_traits::{PropositionExtractor, Result, Summarizer, Turn};

use crate::config::LlmConfig;
use crate::llm::{CompletionRequest, LlmClient, Message};

pub const EXTRACT_PROMPT: &str = include_str!("templates/extract_prompt.md");
pub const CONDENSE_PROMPT: &str = include_str!("templates/condense_prompt.md");

const SUMMARIZE_PROMPT: &str = "Summarize the following text in no more than {max_chars} characters. \
Be concise and preserve key meaning.\n\n{text}";
const EXISTING_PLACEHOLDER: &str = "{{ existing_propositions }}";
const MAX_PLACEHOLDER: &str = "{{ max_propositions }}";

/// Summarizer that asks a chat model for a character-bounded summary.
///
/// One call per summary. Any retrying belongs to the wrapped `LlmClient`.
pub struct LlmSummarizer {
    llm: Arc<dyn LlmClient>,
    max_tokens: Option<u32>,
}

impl LlmSummarizer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            max_tokens: None,
        }
    }

    pub fn from_config(llm: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self::new(llm).with_max_tokens(config.summary_max_tokens)
    }

    /// Cap the completion length of summarization calls.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, text: &str, max_chars: usize) -> Result<String> {
        let prompt = SUMMARIZE_PROMPT
            .replace("{max_chars}", &max_chars.to_string())
            .replace("{text}", text);

        let mut request = CompletionRequest::new(vec![Message::user(prompt)]);
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = self.llm.complete(request).await?;
        Ok(response.content.unwrap_or_default().trim().to_string())
    }
}

/// Proposition extractor and condenser driven by prompt templates.
///
/// One call per extraction or condensation; failures are returned as is and
/// any retrying belongs to the wrapped `LlmClient`.
///
/// Templates use `{{ existing_propositions }}` and `{{ max_propositions }}`
/// placeholders, filled by plain substitution.
pub struct LlmPropositionExtractor {
    llm: Arc<dyn LlmClient>,
    extract_prompt: String,
    condense_prompt: String,
}

impl LlmPropositionExtractor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            extract_prompt: EXTRACT_PROMPT.to_string(),
            condense_prompt: CONDENSE_PROMPT.to_string(),
        }
    }

    pub fn with_extract_prompt(mut self, template: impl Into<String>) -> Self {
        self.extract_prompt = template.into();
        self
    }

    pub fn with_condense_prompt(mut self, template: impl Into<String>) -> Self {
        self.condense_prompt = template.into();
        self
    }

    async fn reply_text(&self, messages: Vec<Message>) -> Result<String> {
        let response = self.llm.complete(CompletionRequest::new(messages)).await?;
        Ok(response.content.unwrap_or_default())
    }
}

fn render_template(template: &str, existing: &str, max_propositions: Option<usize>) -> String {
    let template = match max_propositions {
        Some(max) => template.replace(MAX_PLACEHOLDER, &max.to_string()),
        None => template.to_string(),
    };
    template.replace(EXISTING_PLACEHOLDER, existing)
}

#[async_trait]
impl PropositionExtractor for LlmPropositionExtractor {
    async fn extract(&self, turns: &[Turn], existing: &str) -> Result<String> {
        let mut messages: Vec<Message> = turns.iter().map(Message::from).collect();
        messages.push(Message::user(render_template(
            &self.extract_prompt,
            existing,
            None,
        )));
        self.reply_text(messages).await
    }

    async fn condense(&self, existing: &str, max_propositions: usize) -> Result<String> {
        let prompt = render_template(&self.condense_prompt, existing, Some(max_propositions));
        self.reply_text(vec![Message::user(prompt)]).await
    }
}
