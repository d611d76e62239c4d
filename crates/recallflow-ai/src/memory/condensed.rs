//! Condensed memory - summarized per-turn entries under a token budget
//!
//! Each ingested turn becomes one entry: its text segments (summarized when
//! longer than the summary ceiling) joined by newlines, followed by a
//! rendering of its annotations. After every ingest the oldest entries are
//! evicted until the measured total fits the budget.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> recallflow_traits::Result<()> {
//! use std::sync::Arc;
//! use recallflow_ai::config::CondensedConfig;
//! use recallflow_ai::llm::MockLlmClient;
//! use recallflow_ai::memory::{CondensedBlock, LlmSummarizer};
//! use recallflow_traits::{MemoryBlock, Turn};
//!
//! let summarizer = Arc::new(LlmSummarizer::new(Arc::new(MockLlmClient::new("mock"))));
//! let mut block = CondensedBlock::with_tiktoken(&CondensedConfig::default(), summarizer)?;
//! block.ingest(&[Turn::user("Hello, world!")]).await?;
//! assert_eq!(block.retrieve(), "Hello, world!");
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use recallflow_traits::{
    MemoryBlock, Result, SESSION_ID_KEY, Summarizer, TOOL_CALL_ID_KEY, TOOL_CALLS_KEY,
    TokenCounter, Turn,
};
use serde_json::Value;

use super::tokenizer::TiktokenCounter;
use crate::config::CondensedConfig;

/// Annotation keys that are never persisted.
const EXCLUDED_ANNOTATION_KEYS: [&str; 2] = [SESSION_ID_KEY, TOOL_CALL_ID_KEY];
const ELLIPSIS: &str = "...";

/// Conversation buffer of condensed per-turn entries.
///
/// Entries are only appended at the tail and evicted from the head. After
/// each ingest the total token count fits the budget, unless a single entry
/// remains; that entry is kept even when it alone exceeds the budget.
pub struct CondensedBlock {
    name: String,
    token_budget: usize,
    summary_max_chars: usize,
    /// Entries stored in arrival order (oldest first)
    entries: VecDeque<String>,
    summarizer: Arc<dyn Summarizer>,
    tokenizer: Arc<dyn TokenCounter>,
}

impl CondensedBlock {
    /// Create an empty block. Fails on a zero budget or summary ceiling.
    pub fn new(
        config: &CondensedConfig,
        summarizer: Arc<dyn Summarizer>,
        tokenizer: Arc<dyn TokenCounter>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: config.name.clone(),
            token_budget: config.token_budget,
            summary_max_chars: config.summary_max_chars,
            entries: VecDeque::new(),
            summarizer,
            tokenizer,
        })
    }

    /// Create an empty block measured with the configured model's encoding.
    pub fn with_tiktoken(config: &CondensedConfig, summarizer: Arc<dyn Summarizer>) -> Result<Self> {
        let tokenizer = TiktokenCounter::for_model(&config.encoding_model)?;
        Self::new(config, summarizer, Arc::new(tokenizer))
    }

    /// Stored entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// Total measured tokens across all entries.
    pub fn token_count(&self) -> usize {
        self.entries.iter().map(|e| self.tokenizer.count(e)).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Summarize `text` into at most `max_chars` characters.
    ///
    /// Text that already fits is returned trimmed without calling the
    /// summarizer. An over-long summary is cut to `max_chars` and marked with
    /// an ellipsis. Summarizer failures propagate.
    pub async fn summarize_text(&self, text: &str, max_chars: usize) -> Result<String> {
        let trimmed = text.trim();
        if trimmed.chars().count() <= max_chars {
            return Ok(trimmed.to_string());
        }

        let summary = self.summarizer.summarize(text, max_chars).await?;
        let summary = summary.trim();
        if summary.chars().count() <= max_chars {
            return Ok(summary.to_string());
        }

        let head: String = summary.chars().take(max_chars).collect();
        Ok(format!("{}{}", head.trim_end(), ELLIPSIS))
    }

    async fn render_turn(&self, turn: &Turn) -> Result<String> {
        let mut summaries = Vec::new();
        for text in turn.text_segments() {
            summaries.push(self.summarize_text(text, self.summary_max_chars).await?);
        }

        let mut entry = summaries.join("\n");
        if let Some(annotations) = render_annotations(&turn.annotations) {
            entry.push_str("\n(");
            entry.push_str(&annotations);
            entry.push(')');
        }
        Ok(entry)
    }

    fn evict_to_budget(&mut self) {
        let mut evicted = 0usize;
        while self.entries.len() > 1 && self.token_count() > self.token_budget {
            self.entries.pop_front();
            evicted += 1;
        }

        if evicted > 0 {
            tracing::debug!(
                block = %self.name,
                evicted,
                remaining = self.entries.len(),
                total_tokens = self.token_count(),
                budget = self.token_budget,
                "Evicted oldest condensed entries"
            );
        }
    }
}

#[async_trait]
impl MemoryBlock for CondensedBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn retrieve(&self) -> String {
        self.entries.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }

    async fn ingest(&mut self, turns: &[Turn]) -> Result<()> {
        // Render everything first so a failed summarization leaves no partial state.
        let mut rendered = Vec::with_capacity(turns.len());
        for turn in turns {
            rendered.push(self.render_turn(turn).await?);
        }

        for entry in rendered {
            tracing::debug!(
                block = %self.name,
                chars = entry.chars().count(),
                "Appending condensed entry"
            );
            self.entries.push_back(entry);
        }

        self.evict_to_budget();
        Ok(())
    }
}

/// Render annotations as a compact JSON-style object, or `None` when nothing
/// survives filtering.
fn render_annotations(annotations: &BTreeMap<String, Value>) -> Option<String> {
    let parts: Vec<String> = annotations
        .iter()
        .filter(|(key, _)| !EXCLUDED_ANNOTATION_KEYS.contains(&key.as_str()))
        .map(|(key, value)| {
            let rendered = if key == TOOL_CALLS_KEY {
                reduce_tool_calls(value)
            } else {
                value.to_string()
            };
            format!("{}:{}", Value::String(key.clone()), rendered)
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(format!("{{{}}}", parts.join(",")))
    }
}

/// Reduce raw `[{"function": {"name", "arguments"}}]` tool calls to
/// `[{"name", "args"}]` pairs.
fn reduce_tool_calls(value: &Value) -> String {
    let Some(calls) = value.as_array() else {
        return value.to_string();
    };

    let reduced: Vec<String> = calls
        .iter()
        .filter_map(|call| {
            let function = call.get("function");
            let Some(name) = function.and_then(|f| f.get("name")).and_then(Value::as_str) else {
                tracing::warn!(call = %call, "Dropping tool call without function name");
                return None;
            };
            let args = function
                .and_then(|f| f.get("arguments"))
                .cloned()
                .unwrap_or(Value::Null);
            Some(format!(
                "{{\"name\":{},\"args\":{}}}",
                Value::String(name.to_string()),
                args
            ))
        })
        .collect();

    format!("[{}]", reduced.join(","))
}
