//! RecallFlow Traits - Shared conversation and memory abstractions.
//!
//! This crate provides the interfaces shared across the RecallFlow workspace:
//! - Turn, ContentSegment, Role (conversation messages as seen by memory)
//! - MemoryBlock (the retrieve/ingest capability consumed by agent wrappers)
//! - Summarizer, PropositionExtractor, TokenCounter (external collaborators)
//! - MemoryError

pub mod error;
pub mod memory;
pub mod turn;

// ── Top-level re-exports ─────────────────────────────────────────────

// Error types
pub use error::{BoxError, MemoryError, Result};

// Conversation types
pub use turn::{
    ContentSegment, Role, SESSION_ID_KEY, TOOL_CALL_ID_KEY, TOOL_CALLS_KEY, Turn,
};

// Capability traits
pub use memory::{MemoryBlock, PropositionExtractor, Summarizer, TokenCounter};
