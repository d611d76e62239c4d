//! Memory blocks for AI agents
//!
//! This module provides two bounded memory strategies:
//!
//! - **Condensed**: per-turn entries, long text summarized, oldest entries
//!   evicted once the token budget is exceeded
//! - **Propositions**: discrete statements extracted by an LLM, deduplicated,
//!   and condensed by a second LLM call once a count cap is exceeded
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Memory Block Architecture                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  CondensedBlock                                              │
//! │  ┌────────────────────────────────────────────────────────┐ │
//! │  │  VecDeque<String>      token_budget: 50_000            │ │
//! │  │  text > 128 chars → Summarizer                         │ │
//! │  │  over budget → evict oldest (keep at least one)        │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! │                                                              │
//! │  PropositionBlock                                            │
//! │  ┌────────────────────────────────────────────────────────┐ │
//! │  │  Vec<String>           max_propositions: 50            │ │
//! │  │  turns → PropositionExtractor::extract → dedup merge   │ │
//! │  │  over cap → PropositionExtractor::condense → replace   │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod adapters;
mod condensed;
mod parser;
mod propositions;
mod tokenizer;

pub use adapters::{CONDENSE_PROMPT, EXTRACT_PROMPT, LlmPropositionExtractor, LlmSummarizer};
pub use condensed::CondensedBlock;
pub use parser::{format_propositions, parse_propositions};
pub use propositions::PropositionBlock;
pub use tokenizer::TiktokenCounter;
