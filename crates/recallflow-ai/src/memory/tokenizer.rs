//! Token measurement for memory budgets.

use recallflow_traits::{MemoryError, TokenCounter};
use tiktoken_rs::CoreBPE;

/// Token counter bound to the BPE encoding of one model.
pub struct TiktokenCounter {
    model: String,
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Build a counter for `model` (e.g. `gpt-4o`, which uses `o200k_base`).
    pub fn for_model(model: &str) -> Result<Self, MemoryError> {
        let bpe = tiktoken_rs::get_bpe_from_model(model).map_err(|e| {
            MemoryError::Tokenizer(format!("no encoding for model '{model}': {e}"))
        })?;
        Ok(Self {
            model: model.to_string(),
            bpe,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENCODING_MODEL;

    #[test]
    fn test_counts_tokens_not_chars() {
        let counter = TiktokenCounter::for_model(ENCODING_MODEL).unwrap();
        assert_eq!(counter.count(""), 0);

        let text = "The quick brown fox jumps over the lazy dog.";
        let tokens = counter.count(text);
        assert!(tokens > 0);
        assert!(tokens < text.chars().count());
    }

    #[test]
    fn test_counting_is_deterministic() {
        let counter = TiktokenCounter::for_model(ENCODING_MODEL).unwrap();
        let text = "msg0\nmsg1\n({\"keep\":\"yes\"})";
        assert_eq!(counter.count(text), counter.count(text));
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let err = TiktokenCounter::for_model("definitely-not-a-model").unwrap_err();
        assert!(matches!(err, MemoryError::Tokenizer(_)));
    }
}
