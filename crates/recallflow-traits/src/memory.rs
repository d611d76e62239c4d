//! Memory block capability and the external collaborators it depends on.
//!
//! A [`MemoryBlock`] is a bounded summary of conversation history. Agent
//! wrappers call [`MemoryBlock::retrieve`] before a turn to inject context and
//! [`MemoryBlock::ingest`] after it to update memory. Blocks reach the outside
//! world only through [`Summarizer`], [`PropositionExtractor`] and
//! [`TokenCounter`], all injected at construction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::turn::Turn;

/// Bounded, queryable conversation memory.
///
/// `ingest` takes `&mut self`: one writer per block, ingests run to completion
/// before the next one starts.
#[async_trait]
pub trait MemoryBlock: Send + Sync {
    /// Block name, used as a label when several blocks are combined.
    fn name(&self) -> &str;

    /// Snapshot of the current contents, newline-joined. Empty when nothing
    /// has been stored yet.
    fn retrieve(&self) -> String;

    /// Fold new turns into memory. External failures propagate unchanged.
    async fn ingest(&mut self, turns: &[Turn]) -> Result<()>;
}

/// Best-effort text compression.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text` in no more than `max_chars` characters.
    async fn summarize(&self, text: &str, max_chars: usize) -> Result<String>;
}

/// Chat-style proposition extraction.
///
/// Both methods return the raw assistant reply; callers parse the
/// `<proposition>` tags themselves.
#[async_trait]
pub trait PropositionExtractor: Send + Sync {
    /// Extract propositions from `turns`, grounded on the `existing` tagged list.
    async fn extract(&self, turns: &[Turn], existing: &str) -> Result<String>;

    /// Condense the `existing` tagged list to fewer than `max_propositions` items.
    async fn condense(&self, existing: &str, max_propositions: usize) -> Result<String>;
}

/// Deterministic token count under one fixed encoding.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

#[async_trait]
impl<T: Summarizer + ?Sized> Summarizer for Arc<T> {
    async fn summarize(&self, text: &str, max_chars: usize) -> Result<String> {
        (**self).summarize(text, max_chars).await
    }
}

#[async_trait]
impl<T: PropositionExtractor + ?Sized> PropositionExtractor for Arc<T> {
    async fn extract(&self, turns: &[Turn], existing: &str) -> Result<String> {
        (**self).extract(turns, existing).await
    }

    async fn condense(&self, existing: &str, max_propositions: usize) -> Result<String> {
        (**self).condense(existing, max_propositions).await
    }
}

impl<T: TokenCounter + ?Sized> TokenCounter for Arc<T> {
    fn count(&self, text: &str) -> usize {
        (**self).count(text)
    }
}
