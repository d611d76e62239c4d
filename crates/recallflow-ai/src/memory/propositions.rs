//! Proposition memory - facts, opinions, preferences and goals pulled out of
//! the conversation by an extractor model.
//!
//! Ingest runs in two phases:
//!
//! 1. **Extract**: the extractor sees the new turns plus the current list and
//!    replies with `<proposition>` tags; exact-match duplicates are skipped.
//! 2. **Condense**: if the list now exceeds the cap, the condenser rewrites
//!    the whole list and its output replaces the stored one wholesale.
//!
//! A failure in either phase propagates. A completed merge is not rolled back
//! when the condense call fails afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use recallflow_traits::{MemoryBlock, PropositionExtractor, Result, Turn};

use super::parser::{format_propositions, parse_propositions};
use crate::config::PropositionConfig;

/// Deduplicated, order-preserving list of extracted propositions.
pub struct PropositionBlock {
    name: String,
    max_propositions: usize,
    propositions: Vec<String>,
    extractor: Arc<dyn PropositionExtractor>,
}

impl PropositionBlock {
    /// Create an empty block. Fails on a zero cap.
    pub fn new(config: &PropositionConfig, extractor: Arc<dyn PropositionExtractor>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: config.name.clone(),
            max_propositions: config.max_propositions,
            propositions: Vec::new(),
            extractor,
        })
    }

    pub fn propositions(&self) -> &[String] {
        &self.propositions
    }

    pub fn len(&self) -> usize {
        self.propositions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.propositions.is_empty()
    }

    pub fn max_propositions(&self) -> usize {
        self.max_propositions
    }

    pub fn clear(&mut self) {
        self.propositions.clear();
    }

    /// Append candidates not already stored. Returns how many were added.
    fn merge(&mut self, candidates: Vec<String>) -> usize {
        let before = self.propositions.len();
        for candidate in candidates {
            if !self.propositions.contains(&candidate) {
                self.propositions.push(candidate);
            }
        }
        self.propositions.len() - before
    }

    async fn condense(&mut self) -> Result<()> {
        let existing = format_propositions(&self.propositions);
        let reply = self
            .extractor
            .condense(&existing, self.max_propositions)
            .await?;

        let condensed = parse_propositions(&reply);
        if condensed.is_empty() {
            tracing::warn!(
                block = %self.name,
                count = self.propositions.len(),
                max = self.max_propositions,
                "Condenser returned no propositions, keeping list over cap"
            );
            return Ok(());
        }

        tracing::info!(
            block = %self.name,
            before = self.propositions.len(),
            after = condensed.len(),
            "Condensed propositions"
        );
        self.propositions = condensed;
        Ok(())
    }
}

#[async_trait]
impl MemoryBlock for PropositionBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn retrieve(&self) -> String {
        format_propositions(&self.propositions)
    }

    async fn ingest(&mut self, turns: &[Turn]) -> Result<()> {
        if turns.is_empty() {
            return Ok(());
        }

        let existing = format_propositions(&self.propositions);
        let reply = self.extractor.extract(turns, &existing).await?;

        let candidates = parse_propositions(&reply);
        let candidate_count = candidates.len();
        let added = self.merge(candidates);
        tracing::debug!(
            block = %self.name,
            candidates = candidate_count,
            added,
            total = self.propositions.len(),
            "Merged extracted propositions"
        );

        if self.propositions.len() > self.max_propositions {
            self.condense().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recallflow_traits::MemoryError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    type Reply = std::result::Result<String, String>;

    #[derive(Default)]
    struct ScriptedExtractor {
        extract_replies: Mutex<VecDeque<Reply>>,
        condense_replies: Mutex<VecDeque<Reply>>,
        extract_calls: Mutex<Vec<(usize, String)>>,
        condense_calls: Mutex<Vec<(String, usize)>>,
    }

    impl ScriptedExtractor {
        fn new(extract: Vec<Reply>, condense: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                extract_replies: Mutex::new(extract.into()),
                condense_replies: Mutex::new(condense.into()),
                ..Default::default()
            })
        }
    }

    fn next_reply(queue: &Mutex<VecDeque<Reply>>) -> Result<String> {
        match queue.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(MemoryError::service(message)),
            None => Ok("<propositions></propositions>".to_string()),
        }
    }

    #[async_trait]
    impl PropositionExtractor for ScriptedExtractor {
        async fn extract(&self, turns: &[Turn], existing: &str) -> Result<String> {
            self.extract_calls
                .lock()
                .unwrap()
                .push((turns.len(), existing.to_string()));
            next_reply(&self.extract_replies)
        }

        async fn condense(&self, existing: &str, max_propositions: usize) -> Result<String> {
            self.condense_calls
                .lock()
                .unwrap()
                .push((existing.to_string(), max_propositions));
            next_reply(&self.condense_replies)
        }
    }

    fn ok(reply: &str) -> Reply {
        Ok(reply.to_string())
    }

    fn block_with(cap: usize, extractor: Arc<ScriptedExtractor>) -> PropositionBlock {
        let config = PropositionConfig::default().with_max_propositions(cap);
        PropositionBlock::new(&config, extractor).unwrap()
    }

    #[test]
    fn test_zero_cap_is_rejected() {
        let config = PropositionConfig::default().with_max_propositions(0);
        let result = PropositionBlock::new(&config, ScriptedExtractor::new(vec![], vec![]));
        assert!(matches!(result, Err(MemoryError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_block_retrieves_empty() {
        let block = block_with(5, ScriptedExtractor::new(vec![], vec![]));
        assert_eq!(block.retrieve(), "");
        assert!(block.is_empty());
    }

    #[tokio::test]
    async fn test_empty_turns_skip_extractor() {
        let extractor = ScriptedExtractor::new(vec![], vec![]);
        let mut block = block_with(5, extractor.clone());

        block.ingest(&[]).await.unwrap();

        assert!(extractor.extract_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extracted_propositions_are_stored_and_tagged() {
        let extractor = ScriptedExtractor::new(
            vec![ok(
                "<propositions>\n  <proposition>Sky is blue</proposition>\n  <proposition>Water is wet</proposition>\n</propositions>",
            )],
            vec![],
        );
        let mut block = block_with(5, extractor.clone());

        block
            .ingest(&[Turn::user("The sky is blue. Water is wet.")])
            .await
            .unwrap();

        assert_eq!(block.propositions(), ["Sky is blue", "Water is wet"]);
        assert_eq!(
            block.retrieve(),
            "<proposition>Sky is blue</proposition>\n<proposition>Water is wet</proposition>"
        );
        let calls = extractor.extract_calls.lock().unwrap();
        assert_eq!(calls[0], (1, String::new()));
    }

    #[tokio::test]
    async fn test_existing_propositions_are_sent_as_context() {
        let extractor = ScriptedExtractor::new(
            vec![
                ok("<proposition>A</proposition>"),
                ok("<proposition>B</proposition>"),
            ],
            vec![],
        );
        let mut block = block_with(5, extractor.clone());

        block.ingest(&[Turn::user("a")]).await.unwrap();
        block.ingest(&[Turn::user("b")]).await.unwrap();

        let calls = extractor.extract_calls.lock().unwrap();
        assert_eq!(calls[1].1, "<proposition>A</proposition>");
    }

    #[tokio::test]
    async fn test_dedup_across_ingests() {
        let extractor = ScriptedExtractor::new(
            vec![
                ok("<proposition>User believes the sky is blue</proposition>"),
                ok("<proposition>User believes the sky is blue</proposition>"),
            ],
            vec![],
        );
        let mut block = block_with(5, extractor);

        block.ingest(&[Turn::user("I believe the sky is blue.")]).await.unwrap();
        block.ingest(&[Turn::user("I believe the sky is blue.")]).await.unwrap();

        assert_eq!(block.propositions(), ["User believes the sky is blue"]);
    }

    #[tokio::test]
    async fn test_dedup_within_one_batch_is_exact_match() {
        let extractor = ScriptedExtractor::new(
            vec![ok(
                "<proposition>X</proposition><proposition>X</proposition><proposition>x</proposition>",
            )],
            vec![],
        );
        let mut block = block_with(5, extractor);

        block.ingest(&[Turn::user("...")]).await.unwrap();

        assert_eq!(block.propositions(), ["X", "x"]);
    }

    #[tokio::test]
    async fn test_malformed_reply_adds_nothing() {
        let extractor =
            ScriptedExtractor::new(vec![ok("I could not find anything <proposition>")], vec![]);
        let mut block = block_with(5, extractor);

        block.ingest(&[Turn::user("hmm")]).await.unwrap();
        assert!(block.is_empty());
    }

    #[tokio::test]
    async fn test_cap_triggers_condensation() {
        let extractor = ScriptedExtractor::new(
            vec![
                ok("<proposition>Sky is blue</proposition>"),
                ok("<proposition>Water is wet</proposition>"),
                ok("<proposition>Grass is green</proposition>"),
            ],
            vec![ok(
                "<propositions><proposition>Sky is blue and water is wet</proposition><proposition>Grass is green</proposition></propositions>",
            )],
        );
        let mut block = block_with(2, extractor.clone());

        block.ingest(&[Turn::user("sky")]).await.unwrap();
        block.ingest(&[Turn::user("water")]).await.unwrap();
        assert!(extractor.condense_calls.lock().unwrap().is_empty());

        block.ingest(&[Turn::user("grass")]).await.unwrap();

        assert!(block.len() <= 2);
        assert!(block.propositions().iter().any(|p| p.contains("Grass")));

        let condense_calls = extractor.condense_calls.lock().unwrap();
        assert_eq!(condense_calls.len(), 1);
        assert_eq!(
            condense_calls[0],
            (
                "<proposition>Sky is blue</proposition>\n<proposition>Water is wet</proposition>\n<proposition>Grass is green</proposition>".to_string(),
                2
            )
        );
    }

    #[tokio::test]
    async fn test_condenser_output_replaces_wholesale() {
        let extractor = ScriptedExtractor::new(
            vec![ok("<proposition>A</proposition><proposition>B</proposition>")],
            vec![ok("<proposition>C</proposition><proposition>C</proposition>")],
        );
        let mut block = block_with(1, extractor);

        block.ingest(&[Turn::user("ab")]).await.unwrap();

        assert_eq!(block.propositions(), ["C", "C"]);
    }

    #[tokio::test]
    async fn test_empty_condenser_reply_leaves_list_over_cap() {
        let extractor = ScriptedExtractor::new(
            vec![ok("<proposition>A</proposition><proposition>B</proposition>")],
            vec![ok("<propositions></propositions>")],
        );
        let mut block = block_with(1, extractor);

        block.ingest(&[Turn::user("ab")]).await.unwrap();

        assert_eq!(block.propositions(), ["A", "B"]);
    }

    #[tokio::test]
    async fn test_extractor_failure_propagates_and_keeps_state() {
        let extractor = ScriptedExtractor::new(
            vec![ok("<proposition>A</proposition>"), Err("boom".to_string())],
            vec![],
        );
        let mut block = block_with(5, extractor);
        block.ingest(&[Turn::user("a")]).await.unwrap();

        let err = block.ingest(&[Turn::user("b")]).await.unwrap_err();

        assert!(matches!(err, MemoryError::Service(_)));
        assert!(err.to_string().contains("boom"));
        assert_eq!(block.propositions(), ["A"]);
    }

    #[tokio::test]
    async fn test_condense_failure_keeps_merged_state() {
        let extractor = ScriptedExtractor::new(
            vec![ok("<proposition>A</proposition><proposition>B</proposition>")],
            vec![Err("condenser down".to_string())],
        );
        let mut block = block_with(1, extractor);

        let err = block.ingest(&[Turn::user("ab")]).await.unwrap_err();

        assert!(err.to_string().contains("condenser down"));
        assert_eq!(block.propositions(), ["A", "B"]);
    }
}
